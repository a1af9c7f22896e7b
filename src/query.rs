//! The `pesquisa` document sent to `negocios/listar`.

use serde::Serialize;

use crate::date_window::{CalendarDate, DateRange};

/// Fields requested for each record. Only the aggregate `total` is read back.
pub const QUERY_FIELDS: [&str; 4] = ["Codigo", "DataInicial", "NomeEtapa", "Status"];

/// Page size. Large enough that the store still reports the full `total`.
pub const PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemoteQuery {
    fields: [&'static str; 4],
    filter: QueryFilter,
    order: SortOrder,
    #[serde(rename = "paginacao")]
    pagination: Pagination,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryFilter {
    #[serde(rename = "NomeEtapa")]
    pub stage: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "DataInicial")]
    pub start_date: [CalendarDate; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    #[serde(rename = "DataInicial")]
    pub start_date: SortDirection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(rename = "pagina")]
    pub page: u32,
    #[serde(rename = "quantidade")]
    pub per_page: u32,
}

impl RemoteQuery {
    /// Records with the given stage/status whose start date falls in `range`,
    /// newest first.
    pub fn new(stage: &str, status: &str, range: DateRange) -> Self {
        Self {
            fields: QUERY_FIELDS,
            filter: QueryFilter {
                stage: stage.to_owned(),
                status: status.to_owned(),
                start_date: [range.start(), range.end()],
            },
            order: SortOrder {
                start_date: SortDirection::Desc,
            },
            pagination: Pagination {
                page: 1,
                per_page: PAGE_SIZE,
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
