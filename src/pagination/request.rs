/// One page worth of query, plus implementation-specific filter fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub page: u32,
    pub size: u32,
    pub filter: F,
}

impl<F> PageRequest<F> {
    pub fn first(size: u32, filter: F) -> Self {
        Self {
            page: 1,
            size,
            filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u32,
    pub page: u32,
    pub size: u32,
}

/// Filter shared by the wizard's list steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search: Option<String>,
}

impl ListFilter {
    pub fn search(term: &str) -> Self {
        Self {
            search: Some(term.to_string()),
        }
    }
}
