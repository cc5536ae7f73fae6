//! Page requests and paged results

use crate::core::error::{FieldValidationError, ValidationError};
use serde::{Deserialize, Serialize};

/// Sort direction of a paged query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A 0-based page descriptor
///
/// The sort property is kept as the caller sent it. Each store maps it onto
/// its own columns; services validate it before a query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: String,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: Self::DEFAULT_SIZE,
            sort: String::new(),
            direction: SortDirection::Asc,
        }
    }
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 20;

    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    /// Set the sort property and direction
    pub fn sorted_by(mut self, property: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = property.into();
        self.direction = direction;
        self
    }

    /// Build a page request from signed wire values
    ///
    /// Negative pages and sizes below one are rejected.
    pub fn from_wire(
        page: i32,
        size: i32,
        sort: &str,
        direction: SortDirection,
    ) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        if page < 0 {
            errors.push(FieldValidationError::new(
                "pageable.page",
                "must be greater than or equal to 0",
            ));
        }
        if size < 1 {
            errors.push(FieldValidationError::new(
                "pageable.size",
                "must be greater than 0",
            ));
        }
        if !errors.is_empty() {
            return Err(ValidationError::FieldErrors(errors));
        }

        Ok(Self {
            page: page as u32,
            size: size as u32,
            sort: sort.trim().to_string(),
            direction,
        })
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_size: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_size,
        }
    }

    /// Cut one page out of an already filtered and sorted list
    pub fn slice(all: Vec<T>, request: &PageRequest) -> Self {
        let total_size = all.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = all
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .collect();
        Self::new(content, request, total_size)
    }

    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.size.max(1));
        if self.total_size == 0 {
            0
        } else {
            u32::try_from(self.total_size.div_ceil(size)).unwrap_or(u32::MAX)
        }
    }

    pub fn number_of_elements(&self) -> u32 {
        self.content.len() as u32
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_size: self.total_size,
        }
    }
}
