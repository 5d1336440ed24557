//! How each exhibitor field is located and shaped.

use crate::record::{ExhibitorFields, LabeledLink, Link};
use expo_config::SelectorConfig;
use expo_drivers::Selector;

/// The selector-driven fields of an [`ExhibitorFields`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    WhyVisit,
    Description,
    Branch,
    ProductCategories,
    Gallery,
    Documents,
    Website,
    Email,
    Phone,
    Address,
    Stand,
}

impl Field {
    /// Output column of the field.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::WhyVisit => "why_visit",
            Field::Description => "description",
            Field::Branch => "branch",
            Field::ProductCategories => "product_categories",
            Field::Gallery => "gallery",
            Field::Documents => "documents",
            Field::Website => "website",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Address => "address",
            Field::Stand => "stand",
        }
    }
}

/// Lookup strategy for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// Visible text of the first match.
    Text(Selector),
    /// Visible text of the first element following the label marker.
    LabelSibling(String),
    /// First matching anchor as `{text, url}`.
    LabeledLink(Selector),
    /// Every matching anchor, in document order, as `{title, url}`.
    LinkList(Selector),
}

impl FieldRule {
    /// The selector the rule queries the page with.
    pub fn selector(&self) -> Selector {
        match self {
            FieldRule::Text(s) | FieldRule::LabeledLink(s) | FieldRule::LinkList(s) => s.clone(),
            FieldRule::LabelSibling(label) => Selector::next_sibling_of_label(label.as_str()),
        }
    }

    /// Value the field takes when nothing matches or the lookup fails.
    pub fn empty_value(&self) -> FieldValue {
        match self {
            FieldRule::Text(_) | FieldRule::LabelSibling(_) => FieldValue::Text(String::new()),
            FieldRule::LabeledLink(_) => FieldValue::Link(LabeledLink::default()),
            FieldRule::LinkList(_) => FieldValue::Links(Vec::new()),
        }
    }
}

/// A resolved field, shaped by its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Link(LabeledLink),
    Links(Vec<Link>),
}

/// The ordered set of rules applied to every loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    heading: Selector,
    rules: Vec<(Field, FieldRule)>,
}

impl FieldPlan {
    pub fn from_selectors(s: &SelectorConfig) -> Self {
        let text = |css: &str| FieldRule::Text(Selector::css(css));
        let label = |label: &str| FieldRule::LabelSibling(label.to_string());
        let link = |css: &str| FieldRule::LabeledLink(Selector::css(css));
        let links = |css: &str| FieldRule::LinkList(Selector::css(css));
        let rules = vec![
            (Field::Name, text(&s.heading)),
            (Field::WhyVisit, text(&s.why_visit)),
            (Field::Description, text(&s.description)),
            (Field::Branch, label(&s.branch_label)),
            (Field::ProductCategories, label(&s.product_categories_label)),
            (Field::Gallery, links(&s.gallery)),
            (Field::Documents, links(&s.documents)),
            (Field::Website, link(&s.website)),
            (Field::Email, link(&s.email)),
            (Field::Phone, text(&s.phone)),
            (Field::Address, label(&s.address_label)),
            (Field::Stand, text(&s.stand)),
        ];
        Self {
            heading: Selector::css(s.heading.as_str()),
            rules,
        }
    }

    /// Selector whose presence marks the page as rendered.
    pub fn heading(&self) -> &Selector {
        &self.heading
    }

    pub fn rules(&self) -> &[(Field, FieldRule)] {
        &self.rules
    }
}

impl Default for FieldPlan {
    fn default() -> Self {
        Self::from_selectors(&SelectorConfig::default())
    }
}

impl ExhibitorFields {
    /// Store `value` in the slot for `field`.
    ///
    /// Returns `false`, leaving the record untouched, when the value's shape
    /// does not fit the field.
    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        match (field, value) {
            (Field::Gallery, FieldValue::Links(links)) => self.gallery = links,
            (Field::Documents, FieldValue::Links(links)) => self.documents = links,
            (Field::Website, FieldValue::Link(link)) => self.website = link,
            (Field::Email, FieldValue::Link(link)) => self.email = link,
            (field, FieldValue::Text(text)) => match self.text_slot(field) {
                Some(slot) => *slot = text,
                None => return false,
            },
            _ => return false,
        }
        true
    }

    fn text_slot(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::WhyVisit => Some(&mut self.why_visit),
            Field::Description => Some(&mut self.description),
            Field::Branch => Some(&mut self.branch),
            Field::ProductCategories => Some(&mut self.product_categories),
            Field::Phone => Some(&mut self.phone),
            Field::Address => Some(&mut self.address),
            Field::Stand => Some(&mut self.stand),
            Field::Gallery | Field::Documents | Field::Website | Field::Email => None,
        }
    }
}
