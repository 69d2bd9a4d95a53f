use shared::domain::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Empty,
    Single,
    Multi,
}

/// Read-only snapshot of the selected topology elements, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionContext {
    ids: Vec<ElementId>,
}

impl SelectionContext {
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn cardinality(&self) -> Cardinality {
        match self.ids.len() {
            0 => Cardinality::Empty,
            1 => Cardinality::Single,
            _ => Cardinality::Multi,
        }
    }

    /// The sole selected element, if exactly one is selected.
    pub fn single(&self) -> Option<&ElementId> {
        match self.ids.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl From<ElementId> for SelectionContext {
    fn from(value: ElementId) -> Self {
        Self { ids: vec![value] }
    }
}
