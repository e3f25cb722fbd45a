//! Route resolution: map an accepted request to a unit of cacheable work

use crate::error::RequestError;
use crate::http::Request;
use crate::types::WorkKey;

/// Route table for one server flavor.
///
/// Resolution order is fixed: method first, then path recognition, then the
/// identifying parameters. A terminal error here never touches the cache and
/// never invokes an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routes {
    /// Every path names a file to analyze: `GET /<filename>`
    FileAnalysis,
    /// Single aggregation endpoint: `GET /nobel?fromYear=YYYY&toYear=YYYY`
    NobelAggregation,
}

impl Routes {
    /// Derive the work key for a request, or its terminal error.
    pub fn resolve(&self, request: &Request) -> Result<WorkKey, RequestError> {
        if request.method() != "GET" {
            return Err(RequestError::BadRequest(format!(
                "method '{}' is not supported, use GET",
                request.method()
            )));
        }

        match self {
            Self::FileAnalysis => {
                let name = request.path().trim_start_matches('/').trim();
                if name.is_empty() {
                    return Err(RequestError::BadRequest(
                        "request a file by name: GET /<filename>".to_string(),
                    ));
                }
                Ok(WorkKey::File(name.to_string()))
            }
            Self::NobelAggregation => {
                if !request.path().eq_ignore_ascii_case("/nobel") {
                    return Err(RequestError::NotFound(format!(
                        "no route for '{}', try /nobel?fromYear=YYYY&toYear=YYYY",
                        request.path()
                    )));
                }
                let from = request.query("fromYear").filter(|v| !v.is_empty());
                let to = request.query("toYear").filter(|v| !v.is_empty());
                match (from, to) {
                    (Some(from), Some(to)) => Ok(WorkKey::YearRange {
                        from: from.to_string(),
                        to: to.to_string(),
                    }),
                    _ => Err(RequestError::BadRequest(
                        "both 'fromYear' and 'toYear' query parameters are required".to_string(),
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn get(path: &str, query: &[(&str, &str)]) -> Request {
        let query: HashMap<String, String> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Request::new("GET", path, query, peer())
    }

    #[test]
    fn non_get_is_bad_request_for_every_flavor() {
        let request = Request::new("POST", "/nobel", HashMap::new(), peer());
        assert!(matches!(
            Routes::FileAnalysis.resolve(&request),
            Err(RequestError::BadRequest(_))
        ));
        assert!(matches!(
            Routes::NobelAggregation.resolve(&request),
            Err(RequestError::BadRequest(_))
        ));
    }

    #[test]
    fn file_route_strips_the_leading_slash() {
        let key = Routes::FileAnalysis.resolve(&get("/poem.txt", &[])).unwrap();
        assert_eq!(key, WorkKey::File("poem.txt".to_string()));
    }

    #[test]
    fn empty_filename_is_bad_request() {
        assert!(matches!(
            Routes::FileAnalysis.resolve(&get("/", &[])),
            Err(RequestError::BadRequest(_))
        ));
    }

    #[test]
    fn nobel_route_requires_the_nobel_path() {
        let err = Routes::NobelAggregation
            .resolve(&get("/prizes", &[("fromYear", "2000"), ("toYear", "2001")]))
            .unwrap_err();
        assert!(matches!(err, RequestError::NotFound(_)));
        assert!(err.to_string().contains("/prizes"));
    }

    #[test]
    fn nobel_path_is_case_insensitive() {
        let key = Routes::NobelAggregation
            .resolve(&get("/Nobel", &[("fromYear", "2000"), ("toYear", "2001")]))
            .unwrap();
        assert_eq!(
            key,
            WorkKey::YearRange {
                from: "2000".to_string(),
                to: "2001".to_string(),
            }
        );
    }

    #[test]
    fn missing_or_empty_year_bound_is_bad_request() {
        assert!(matches!(
            Routes::NobelAggregation.resolve(&get("/nobel", &[("fromYear", "2000")])),
            Err(RequestError::BadRequest(_))
        ));
        assert!(matches!(
            Routes::NobelAggregation
                .resolve(&get("/nobel", &[("fromYear", "2000"), ("toYear", "")])),
            Err(RequestError::BadRequest(_))
        ));
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = Routes::FileAnalysis.resolve(&get("/a.txt", &[])).unwrap();
        let b = Routes::FileAnalysis.resolve(&get("/a.txt", &[])).unwrap();
        assert_eq!(a, b);
    }
}
