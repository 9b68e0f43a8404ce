use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// One token of a page specification: a single page or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Parse a page token like "5" or "1-3"
    pub fn parse(s: &str) -> Result<Self> {
        let token = s.trim();
        let malformed = |reason| Error::MalformedFilter {
            token: token.to_string(),
            reason,
        };

        if token.is_empty() {
            return Err(malformed("empty page token"));
        }

        if token.contains('-') {
            let parts: Vec<&str> = token.split('-').collect();
            if parts.len() != 2 || parts.iter().any(|p| p.trim().is_empty()) {
                return Err(malformed("a range must look like a-b"));
            }

            let start = parse_page_number(parts[0]).ok_or_else(|| malformed("not a page number"))?;
            let end = parse_page_number(parts[1]).ok_or_else(|| malformed("not a page number"))?;

            if start == 0 || end == 0 {
                return Err(malformed("page numbers start at 1"));
            }
            if start > end {
                return Err(malformed("range start is after its end"));
            }

            Ok(PageRange { start, end })
        } else {
            let page = parse_page_number(token).ok_or_else(|| malformed("not a page number"))?;
            if page == 0 {
                return Err(malformed("page numbers start at 1"));
            }
            Ok(PageRange {
                start: page,
                end: page,
            })
        }
    }

    /// Expand this range into the 1-based pages it covers
    pub fn expand(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

fn parse_page_number(s: &str) -> Option<u32> {
    let s = s.trim();
    // u32::from_str accepts a leading '+'
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Normalized set of 1-based page numbers used as a skip/removal filter.
///
/// Pages are kept as sorted, non-overlapping ranges, so a token like
/// `1-4000000000` costs one entry rather than billions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet {
    ranges: Vec<PageRange>,
}

impl PageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ranges(ranges: &[PageRange]) -> Self {
        let mut sorted = ranges.to_vec();
        sorted.sort_unstable_by_key(|r| r.start);

        let mut merged: Vec<PageRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                // overlapping or adjacent ranges collapse into one
                Some(last) if range.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        PageSet { ranges: merged }
    }

    /// Parse tokens such as `["1-3", "5", "10-12"]`
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranges = tokens
            .into_iter()
            .map(|t| PageRange::parse(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_ranges(&ranges))
    }

    /// Parse a single string of comma- or whitespace-delimited tokens like "1-3, 5 10-12"
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_tokens(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty()),
        )
    }

    pub fn contains(&self, page: u32) -> bool {
        let idx = self.ranges.partition_point(|r| r.end < page);
        self.ranges.get(idx).is_some_and(|r| r.start <= page)
    }

    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|r| (r.end - r.start) as usize + 1)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn max(&self) -> Option<u32> {
        self.ranges.last().map(|r| r.end)
    }

    /// Pages in ascending order. Call [`PageSet::check_within`] first when the
    /// set comes from user input.
    pub fn to_sorted_vec(&self) -> Vec<u32> {
        self.ranges.iter().flat_map(PageRange::expand).collect()
    }

    /// Fail if any page lies beyond the end of a `total`-page document
    pub fn check_within(&self, total: u32) -> Result<()> {
        match self.max() {
            Some(page) if page > total => Err(Error::PageOutOfRange { page, total }),
            _ => Ok(()),
        }
    }
}
