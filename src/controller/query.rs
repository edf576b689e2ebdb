use std::fmt;
use std::str::FromStr;

use crate::api::dto::ListParams;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    CreatedAt,
    Rating,
    TotalVisits,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "createdAt",
            SortField::Rating => "rating",
            SortField::TotalVisits => "totalVisits",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort key sent to the list endpoint as `field,direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Options offered to the user, in display order.
    pub const PRESETS: [(&'static str, SortSpec); 6] = [
        ("Title (A-Z)", SortSpec::new(SortField::Title, SortDirection::Asc)),
        ("Title (Z-A)", SortSpec::new(SortField::Title, SortDirection::Desc)),
        ("Newest First", SortSpec::new(SortField::CreatedAt, SortDirection::Desc)),
        ("Oldest First", SortSpec::new(SortField::CreatedAt, SortDirection::Asc)),
        ("Highest Rated", SortSpec::new(SortField::Rating, SortDirection::Desc)),
        ("Most Popular", SortSpec::new(SortField::TotalVisits, SortDirection::Desc)),
    ];

    pub fn label(&self) -> Option<&'static str> {
        Self::PRESETS
            .iter()
            .find(|(_, spec)| spec == self)
            .map(|(label, _)| *label)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortField::Title, SortDirection::Asc)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field.as_str(), self.direction.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s
            .split_once(',')
            .ok_or_else(|| AppError::InvalidInput(format!("sort must be field,direction: {}", s)))?;

        let field = match field.trim() {
            "title" => SortField::Title,
            "createdAt" => SortField::CreatedAt,
            "rating" => SortField::Rating,
            "totalVisits" => SortField::TotalVisits,
            other => {
                return Err(AppError::InvalidInput(format!("unknown sort field: {}", other)));
            }
        };
        let direction = match direction.trim() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => {
                return Err(AppError::InvalidInput(format!("unknown sort direction: {}", other)));
            }
        };

        Ok(Self::new(field, direction))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    Six,
    #[default]
    Ten,
    Twelve,
    TwentyFour,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Six,
        PageSize::Ten,
        PageSize::Twelve,
        PageSize::TwentyFour,
    ];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Six => 6,
            PageSize::Ten => 10,
            PageSize::Twelve => 12,
            PageSize::TwentyFour => 24,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or_else(|| {
                AppError::InvalidInput(format!("page size must be one of 6, 10, 12, 24: {}", value))
            })
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Which endpoint is authoritative for the displayed list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Search { query: String },
}

impl Mode {
    pub fn is_search(&self) -> bool {
        matches!(self, Mode::Search { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryState {
    pub page: u32,
    pub size: PageSize,
    pub sort: SortSpec,
    pub search_text: String,
    pub mode: Mode,
}

impl QueryState {
    pub fn list_params(&self) -> ListParams {
        ListParams {
            page: self.page,
            size: self.size.get(),
            sort: self.sort.to_string(),
        }
    }
}
