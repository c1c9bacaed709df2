use crate::conversion::Suffix;
use crate::error::Error;

/// One `SUFFIX:COUNT` line of a range response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub suffix: String,
    pub count: u64,
}

/// All suffixes the range API returned for one prefix, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    entries: Vec<CandidateEntry>,
}

impl CandidateSet {
    /// Parse a range response body.
    ///
    /// Accepts `\n` and `\r\n` line endings and skips blank lines. Any other line
    /// must be `SUFFIX:COUNT` with a non-empty suffix and a decimal count; the
    /// first one that is not fails the whole response.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let mut entries = Vec::with_capacity(body.len() / 40 + 1);

        for (idx, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let malformed = |reason: &str| Error::MalformedResponse {
                line: idx + 1,
                reason: reason.to_string(),
            };

            let mut fields = line.split(':');
            let (Some(suffix), Some(count), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed("expected SUFFIX:COUNT"));
            };

            let suffix = suffix.trim();
            if suffix.is_empty() {
                return Err(malformed("empty suffix"));
            }

            let count = count.trim();
            if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed("count is not a non-negative integer"));
            }
            let count = count.parse().map_err(|_| malformed("count out of range"))?;

            entries.push(CandidateEntry { suffix: suffix.to_string(), count });
        }

        Ok(Self { entries })
    }

    /// Count of the first entry matching `suffix`, ignoring ASCII case.
    pub fn find(&self, suffix: &Suffix) -> Option<u64> {
        self.entries.iter().find(|e| suffix.matches(&e.suffix)).map(|e| e.count)
    }

    pub fn entries(&self) -> &[CandidateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<CandidateEntry>> for CandidateSet {
    fn from(entries: Vec<CandidateEntry>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::split;

    #[test]
    fn test_parse_keeps_order_and_zero_counts() {
        let set = CandidateSet::parse("SUFFIX1:5\nSUFFIX2:0\n").unwrap();

        assert_eq!(
            set.entries(),
            &[
                CandidateEntry { suffix: "SUFFIX1".to_string(), count: 5 },
                CandidateEntry { suffix: "SUFFIX2".to_string(), count: 0 },
            ]
        );
    }

    #[test]
    fn test_parse_crlf_and_blank_lines() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:3\r\n\
                    \r\n\
                    00D4F6E8FA6EECAD2A3AA415EEC418D38EC:2\r\n";
        let set = CandidateSet::parse(body).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[0].count, 3);
        assert_eq!(set.entries()[1].suffix, "00D4F6E8FA6EECAD2A3AA415EEC418D38EC");
    }

    #[test]
    fn test_parse_empty_body() {
        let set = CandidateSet::parse("").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_integer_count() {
        let err = CandidateSet::parse("AAA111:1\nAAA222:not_a_number\n").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_parse_rejects_negative_count() {
        let err = CandidateSet::parse("AAA111:-4").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        for body in ["AAA111", "AAA111:1:2", ":5", "AAA111:"] {
            assert!(
                matches!(CandidateSet::parse(body), Err(Error::MalformedResponse { .. })),
                "{body:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_find_first_match_wins() {
        let (_, suffix) = split(b"password");
        let set = CandidateSet::parse(
            "0018A45C4D1DEF81644B54AB7F969B88D65:3\n\
             1e4c9b93f3f0682250b6cf8331b7ee68fd8:7\n\
             1E4C9B93F3F0682250B6CF8331B7EE68FD8:9\n",
        )
        .unwrap();

        assert_eq!(set.find(&suffix), Some(7));
    }

    #[test]
    fn test_find_no_match() {
        let (_, suffix) = split(b"password");
        let set = CandidateSet::parse("0018A45C4D1DEF81644B54AB7F969B88D65:3\n").unwrap();

        assert_eq!(set.find(&suffix), None);
    }
}
