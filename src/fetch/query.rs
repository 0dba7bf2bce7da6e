use crate::config::QueryConfig;
use url::Url;

/// Search parameters sent with every page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub year: Option<i32>,
    pub keyword: String,
    pub buyer: Option<String>,
}

impl SearchQuery {
    /// Query-string pairs for the given page; absent or blank values are omitted
    pub fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);

        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }

        let keyword = self.keyword.trim();
        if !keyword.is_empty() {
            params.push(("search", keyword.to_string()));
        }

        params.push(("page", page.to_string()));

        if let Some(buyer) = self.buyer.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            params.push(("buyer", buyer.to_string()));
        }

        params
    }

    /// Full request URL for a page, as it would be sent
    pub fn request_url(&self, base_url: &str, page: u32) -> Result<Url, url::ParseError> {
        let params = self.params(page);
        Url::parse_with_params(base_url, params.iter().map(|(k, v)| (*k, v.as_str())))
    }
}

impl From<&QueryConfig> for SearchQuery {
    fn from(query: &QueryConfig) -> Self {
        Self {
            year: query.year,
            keyword: query.keyword.trim().to_string(),
            buyer: query.buyer_filter().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_include_only_present_values() {
        let query = SearchQuery {
            year: None,
            keyword: "agua".to_string(),
            buyer: Some("  ".to_string()),
        };

        assert_eq!(
            query.params(1),
            vec![("search", "agua".to_string()), ("page", "1".to_string())]
        );
    }

    #[test]
    fn test_params_with_all_values() {
        let query = SearchQuery {
            year: Some(2023),
            keyword: "agua".to_string(),
            buyer: Some("Guayas".to_string()),
        };

        assert_eq!(
            query.params(3),
            vec![
                ("year", "2023".to_string()),
                ("search", "agua".to_string()),
                ("page", "3".to_string()),
                ("buyer", "Guayas".to_string()),
            ]
        );
    }

    #[test]
    fn test_request_url() {
        let query = SearchQuery {
            year: Some(2021),
            keyword: "agua potable".to_string(),
            buyer: None,
        };

        let url = query
            .request_url("https://api.example.com/search_ocds", 2)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/search_ocds?year=2021&search=agua+potable&page=2"
        );
    }

    #[test]
    fn test_from_query_config() {
        let config = QueryConfig {
            year: Some(2020),
            keyword: " agua ".to_string(),
            buyer: Some("".to_string()),
            contract_type: Some("obra".to_string()),
        };

        let query = SearchQuery::from(&config);
        assert_eq!(query.keyword, "agua");
        assert_eq!(query.buyer, None);
        assert_eq!(query.year, Some(2020));
    }
}
