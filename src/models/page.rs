//! Paginated envelope returned by the backend list endpoints.

use serde::Deserialize;

use crate::listing::pagination::Page;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: usize,
    pub page_size: usize,
}

/// `{content, totalPages, totalElements, numberOfElements, pageable}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub total_elements: usize,
    #[serde(default)]
    pub number_of_elements: usize,
    /// Absent, or a bare string, on unpaged responses.
    #[serde(default, deserialize_with = "lenient_pageable")]
    pub pageable: Option<Pageable>,
    /// Top-level page index sent alongside `pageable` by some endpoints.
    #[serde(default)]
    pub number: Option<usize>,
}

fn lenient_pageable<'de, D>(deserializer: D) -> Result<Option<Pageable>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Paged(Pageable),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Paged(pageable)) => Some(pageable),
        _ => None,
    })
}

impl<T> PageEnvelope<T> {
    /// Zero-based index of the page the backend actually answered.
    pub fn page_number(&self) -> usize {
        self.pageable
            .map(|pageable| pageable.page_number)
            .or(self.number)
            .unwrap_or(0)
    }

    /// Converts every row and keeps the backend's paging metadata.
    pub fn try_into_page<U, E>(self, convert: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let page_number = self.page_number();
        let items = self
            .content
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<U>, E>>()?;
        Ok(Page::new(
            items,
            self.total_elements,
            self.total_pages,
            page_number,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_backend_page_index_from_pageable() {
        let envelope: PageEnvelope<u32> = serde_json::from_str(
            r#"{
                "content": [11, 12],
                "totalPages": 2,
                "totalElements": 15,
                "numberOfElements": 2,
                "pageable": {"pageNumber": 1, "pageSize": 10}
            }"#,
        )
        .unwrap();

        let page = envelope.try_into_page(Ok::<_, ()>).unwrap();
        assert_eq!(page, Page::new(vec![11, 12], 15, 2, 1));
    }

    #[test]
    fn unpaged_marker_falls_back_to_number() {
        let envelope: PageEnvelope<u32> = serde_json::from_str(
            r#"{"content": [], "totalPages": 0, "totalElements": 0, "pageable": "INSTANCE", "number": 0}"#,
        )
        .unwrap();

        assert_eq!(envelope.pageable, None);
        assert_eq!(envelope.page_number(), 0);
    }
}
