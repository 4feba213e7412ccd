//! Windowed pagination with client-side filtering.
//!
//! The upstream `GET /agents` endpoint only supports `limit`/`offset`
//! windowing; it cannot filter. Filtering therefore happens on this side of
//! the wire: a filtered fetch scans forward through upstream pages,
//! applying the predicate to each row, until the requested window is full,
//! the data runs out, or the configured page cap stops the scan. The caller
//! can always tell which of the three happened.

use log::debug;
use serde::Serialize;

use crate::error::{AbError, Result};
use crate::models::agent::Agent;

/// One upstream page plus the server's unfiltered total.
#[derive(Debug, Clone)]
pub struct AgentPage {
    pub agents: Vec<Agent>,
    pub total_items: u64,
}

/// Paged access to the upstream agent list.
///
/// Implemented by the HTTP client; tests substitute in-memory sources.
/// Contract: returns at most `limit` rows starting at `offset` in a stable
/// order, along with the exact unfiltered total; a short page means no rows
/// exist beyond it; an offset past the end yields an empty page.
pub trait AgentSource {
    fn fetch_page(&mut self, limit: u32, offset: u32) -> Result<AgentPage>;
}

/// Client-side filter criteria, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentFilter {
    /// Exact, case-sensitive match on the agent type.
    pub agent_type: Option<String>,
    /// Case-insensitive substring match on the agent name. Leading and
    /// trailing `*` are cosmetic and stripped before matching.
    pub name_pattern: Option<String>,
}

impl AgentFilter {
    pub fn new(agent_type: Option<String>, name_pattern: Option<String>) -> Self {
        Self {
            agent_type,
            name_pattern,
        }
    }

    /// True when no criterion constrains anything; empty strings and
    /// all-wildcard patterns count as absent.
    pub fn is_empty(&self) -> bool {
        let type_empty = self.agent_type.as_deref().map_or(true, str::is_empty);
        let name_empty = self
            .name_pattern
            .as_deref()
            .map_or(true, |p| p.trim_matches('*').is_empty());
        type_empty && name_empty
    }

    pub fn matches(&self, agent: &Agent) -> bool {
        if let Some(wanted) = self.agent_type.as_deref() {
            if !wanted.is_empty() && agent.agent_type != wanted {
                return false;
            }
        }
        if let Some(pattern) = self.name_pattern.as_deref() {
            let needle = pattern.trim_matches('*').to_lowercase();
            if !needle.is_empty() && !agent.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Where a window starts: an absolute row offset, or a 1-based page number.
/// Page numbers only make sense without filters, where `(page - 1) * limit`
/// is a valid upstream offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    Offset(u32),
    Page(u32),
}

impl Default for PageCursor {
    fn default() -> Self {
        PageCursor::Offset(0)
    }
}

/// A single request for a window of the agent list.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: PageCursor,
    pub filter: AgentFilter,
}

/// Why a paginated fetch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// The requested window was filled.
    Complete,
    /// Upstream returned a short page; no rows exist beyond this point.
    Exhausted,
    /// The filtered scan stopped at `max_filter_pages` with the window
    /// still open. More matches may exist past the scan cursor.
    CapReached,
}

/// One window of agents plus everything needed to describe and resume it.
///
/// For unfiltered results `total_count` is the server's exact total and
/// `offset` addresses the result list directly. For filtered results
/// `total_count` is unknown and `offset` is the pre-filter scan start; a
/// filtered "page N" is not addressable, only forward continuation via
/// [`PaginatedResult::next_offset`].
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult {
    pub agents: Vec<Agent>,
    pub offset: u32,
    pub limit: u32,
    pub total_count: Option<u64>,
    pub filter: AgentFilter,
    /// Upstream calls made to produce this window (always >= 1).
    pub pages_fetched: u32,
    pub status: ScanStatus,
    /// Upstream offset just past the last row examined.
    pub next_scan_offset: u32,
}

impl PaginatedResult {
    pub fn has_filters(&self) -> bool {
        !self.filter.is_empty()
    }

    /// Whether more rows may exist past this window. Exact when the total
    /// is known; otherwise anything short of proven exhaustion counts as
    /// "maybe more".
    pub fn has_more(&self) -> bool {
        match self.total_count {
            Some(total) => (self.offset as u64 + self.agents.len() as u64) < total,
            None => self.status != ScanStatus::Exhausted,
        }
    }

    /// Upstream offset to continue from, when continuing makes sense.
    pub fn next_offset(&self) -> Option<u32> {
        if self.has_more() {
            Some(self.next_scan_offset)
        } else {
            None
        }
    }
}

/// Fetch one window of the agent list, reconciling upstream offset
/// pagination with client-side filtering.
///
/// Invalid requests (zero limit, zero or overflowing page number, page
/// jumps combined with filters) fail before any upstream call. The first
/// upstream error aborts the fetch and propagates unchanged; this function
/// never retries and never sleeps.
pub fn fetch_agents_paginated<S: AgentSource>(
    source: &mut S,
    request: &PageRequest,
    max_filter_pages: u32,
) -> Result<PaginatedResult> {
    if request.limit == 0 {
        return Err(AbError::InvalidRequest(
            "limit must be at least 1".to_string(),
        ));
    }

    let filtered = !request.filter.is_empty();
    let offset = match request.cursor {
        PageCursor::Offset(offset) => {
            // The window must end inside the addressable offset range.
            if offset.checked_add(request.limit).is_none() {
                return Err(AbError::InvalidRequest(format!(
                    "offset {} is out of range",
                    offset
                )));
            }
            offset
        }
        PageCursor::Page(page) => {
            if page == 0 {
                return Err(AbError::InvalidRequest(
                    "page numbers start at 1".to_string(),
                ));
            }
            if filtered {
                return Err(AbError::InvalidRequest(
                    "page jumps cannot be combined with type or name filters; \
                     filtered results are only reachable by scanning forward from an offset"
                        .to_string(),
                ));
            }
            // page * limit is the window end, so checking it covers both
            // the start offset and the window's last row.
            let end = page.checked_mul(request.limit).ok_or_else(|| {
                AbError::InvalidRequest(format!("page {} is out of range", page))
            })?;
            end - request.limit
        }
    };

    if filtered {
        scan_filtered(source, request.limit, offset, &request.filter, max_filter_pages)
    } else {
        fetch_window(source, request.limit, offset)
    }
}

/// Unfiltered mode: one upstream fetch, exact total.
fn fetch_window<S: AgentSource>(
    source: &mut S,
    limit: u32,
    offset: u32,
) -> Result<PaginatedResult> {
    let page = source.fetch_page(limit, offset)?;
    let returned = page.agents.len() as u32;
    let status = if (offset as u64 + returned as u64) < page.total_items {
        ScanStatus::Complete
    } else {
        ScanStatus::Exhausted
    };

    Ok(PaginatedResult {
        agents: page.agents,
        offset,
        limit,
        total_count: Some(page.total_items),
        filter: AgentFilter::default(),
        pages_fetched: 1,
        status,
        // offset + limit was range-checked on entry and returned <= limit.
        next_scan_offset: offset + returned,
    })
}

/// Filtered mode: scan upstream pages forward, bounded by `max_filter_pages`,
/// collecting matches until the window fills or the data ends.
fn scan_filtered<S: AgentSource>(
    source: &mut S,
    limit: u32,
    start: u32,
    filter: &AgentFilter,
    max_filter_pages: u32,
) -> Result<PaginatedResult> {
    let mut matches: Vec<Agent> = Vec::new();
    let mut cursor = start;
    let mut pages_fetched: u32 = 0;
    let mut exhausted = false;

    while pages_fetched < max_filter_pages {
        let page = source.fetch_page(limit, cursor)?;
        let returned = page.agents.len() as u32;
        // No row past u32::MAX is addressable, so hitting the ceiling
        // ends the scan the same way a short page does.
        let ceiling_hit = cursor.checked_add(returned).is_none();
        cursor = cursor.saturating_add(returned);
        pages_fetched += 1;

        matches.extend(page.agents.into_iter().filter(|agent| filter.matches(agent)));
        debug!(
            "filter scan: page {} returned {} rows, {} matches so far",
            pages_fetched,
            returned,
            matches.len()
        );

        if returned < limit || ceiling_hit {
            exhausted = true;
            break;
        }
        if matches.len() >= limit as usize {
            break;
        }
    }

    // A final short page can both prove exhaustion and fill the window; a
    // full window wins, and the next continuation reports the end.
    let window_filled = matches.len() >= limit as usize;
    matches.truncate(limit as usize);
    let status = if window_filled {
        ScanStatus::Complete
    } else if exhausted {
        ScanStatus::Exhausted
    } else {
        ScanStatus::CapReached
    };

    Ok(PaginatedResult {
        agents: matches,
        offset: start,
        limit,
        total_count: None,
        filter: filter.clone(),
        pages_fetched,
        status,
        next_scan_offset: cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// In-memory source that serves slices of a fixed agent list and
    /// counts upstream calls.
    struct StubSource {
        agents: Vec<Agent>,
        calls: u32,
        fail_on_call: Option<u32>,
    }

    impl StubSource {
        fn new(agents: Vec<Agent>) -> Self {
            Self {
                agents,
                calls: 0,
                fail_on_call: None,
            }
        }
    }

    impl AgentSource for StubSource {
        fn fetch_page(&mut self, limit: u32, offset: u32) -> Result<AgentPage> {
            self.calls += 1;
            if Some(self.calls) == self.fail_on_call {
                return Err(AbError::Server {
                    status: 502,
                    message: "bad gateway".to_string(),
                });
            }
            let start = (offset as usize).min(self.agents.len());
            let end = (start + limit as usize).min(self.agents.len());
            Ok(AgentPage {
                agents: self.agents[start..end].to_vec(),
                total_items: self.agents.len() as u64,
            })
        }
    }

    /// Serves a full page of `base` agents at every offset, as if the
    /// upstream data never ended.
    struct EndlessSource {
        calls: u32,
    }

    impl AgentSource for EndlessSource {
        fn fetch_page(&mut self, limit: u32, _offset: u32) -> Result<AgentPage> {
            self.calls += 1;
            Ok(AgentPage {
                agents: (0..limit)
                    .map(|n| agent(n, &format!("Agent {:03}", n), "base"))
                    .collect(),
                total_items: u64::from(u32::MAX),
            })
        }
    }

    fn agent(n: u32, name: &str, agent_type: &str) -> Agent {
        Agent {
            id: Uuid::from_u128(n as u128),
            agent_type: agent_type.to_string(),
            name: name.to_string(),
            description: String::new(),
            status: "CREATED".to_string(),
            is_global_agent: false,
            current_version_id: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            created_by: "tests@example.com".to_string(),
            modified_at: "2025-01-01T00:00:00Z".to_string(),
            modified_by: None,
        }
    }

    fn fleet(count: u32) -> Vec<Agent> {
        (0..count)
            .map(|n| agent(n, &format!("Agent {:03}", n), "base"))
            .collect()
    }

    fn request(limit: u32, cursor: PageCursor, filter: AgentFilter) -> PageRequest {
        PageRequest {
            limit,
            cursor,
            filter,
        }
    }

    fn type_filter(agent_type: &str) -> AgentFilter {
        AgentFilter::new(Some(agent_type.to_string()), None)
    }

    // ---- Filter predicate --------------------------------------------------

    #[test]
    fn test_filter_name_substring_case_insensitive() {
        let calculator = agent(1, "Calculator Tool", "tool");
        for pattern in ["calc", "CALC", "*calc*", "Calculator*", "*TOOL"] {
            let filter = AgentFilter::new(None, Some(pattern.to_string()));
            assert!(filter.matches(&calculator), "pattern {:?} should match", pattern);
        }
        let filter = AgentFilter::new(None, Some("rag".to_string()));
        assert!(!filter.matches(&calculator));
    }

    #[test]
    fn test_filter_type_exact_case_sensitive() {
        let calculator = agent(1, "Calculator Tool", "tool");
        assert!(type_filter("tool").matches(&calculator));
        assert!(!type_filter("Tool").matches(&calculator));
        assert!(!type_filter("rag").matches(&calculator));
    }

    #[test]
    fn test_filter_criteria_are_anded() {
        let calculator = agent(1, "Calculator Tool", "tool");
        let both = AgentFilter::new(Some("tool".to_string()), Some("calc".to_string()));
        assert!(both.matches(&calculator));

        let wrong_type = AgentFilter::new(Some("rag".to_string()), Some("calc".to_string()));
        assert!(!wrong_type.matches(&calculator));
    }

    #[test]
    fn test_filter_empty_criteria_match_everything() {
        let calculator = agent(1, "Calculator Tool", "tool");
        for filter in [
            AgentFilter::default(),
            AgentFilter::new(Some(String::new()), None),
            AgentFilter::new(None, Some(String::new())),
            AgentFilter::new(None, Some("***".to_string())),
        ] {
            assert!(filter.is_empty());
            assert!(filter.matches(&calculator));
        }
    }

    #[test]
    fn test_filter_with_criteria_is_not_empty() {
        assert!(!type_filter("rag").is_empty());
        assert!(!AgentFilter::new(None, Some("calc".to_string())).is_empty());
    }

    // ---- Unfiltered windowing ----------------------------------------------

    #[test]
    fn test_unfiltered_window_middle_page() {
        let mut source = StubSource::new(fleet(150));
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(50), AgentFilter::default()),
            10,
        )
        .unwrap();

        assert_eq!(result.agents.len(), 50);
        assert_eq!(result.agents[0].name, "Agent 050");
        assert_eq!(result.agents[49].name, "Agent 099");
        assert_eq!(result.total_count, Some(150));
        assert_eq!(result.pages_fetched, 1);
        assert_eq!(source.calls, 1);
        assert!(result.has_more());
        assert!(!result.has_filters());
        assert_eq!(result.next_offset(), Some(100));
        assert_eq!(result.status, ScanStatus::Complete);
    }

    #[test]
    fn test_page_number_is_offset_arithmetic() {
        let mut by_page = StubSource::new(fleet(150));
        let mut by_offset = StubSource::new(fleet(150));

        let paged = fetch_agents_paginated(
            &mut by_page,
            &request(50, PageCursor::Page(2), AgentFilter::default()),
            10,
        )
        .unwrap();
        let offset = fetch_agents_paginated(
            &mut by_offset,
            &request(50, PageCursor::Offset(50), AgentFilter::default()),
            10,
        )
        .unwrap();

        let paged_ids: Vec<_> = paged.agents.iter().map(|a| a.id).collect();
        let offset_ids: Vec<_> = offset.agents.iter().map(|a| a.id).collect();
        assert_eq!(paged_ids, offset_ids);
        assert_eq!(paged.offset, 50);
    }

    #[test]
    fn test_page_one_starts_at_zero() {
        let mut source = StubSource::new(fleet(10));
        let result = fetch_agents_paginated(
            &mut source,
            &request(5, PageCursor::Page(1), AgentFilter::default()),
            10,
        )
        .unwrap();
        assert_eq!(result.offset, 0);
        assert_eq!(result.agents[0].name, "Agent 000");
    }

    #[test]
    fn test_unfiltered_short_dataset_reports_end() {
        let mut source = StubSource::new(fleet(37));
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(0), AgentFilter::default()),
            10,
        )
        .unwrap();

        assert_eq!(result.agents.len(), 37);
        assert_eq!(result.total_count, Some(37));
        assert!(!result.has_more());
        assert_eq!(result.next_offset(), None);
        assert_eq!(result.status, ScanStatus::Exhausted);
    }

    #[test]
    fn test_unfiltered_last_exact_page() {
        let mut source = StubSource::new(fleet(100));
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(50), AgentFilter::default()),
            10,
        )
        .unwrap();
        assert_eq!(result.agents.len(), 50);
        assert!(!result.has_more());
        assert_eq!(result.next_offset(), None);
    }

    #[test]
    fn test_unfiltered_offset_past_end_is_empty() {
        let mut source = StubSource::new(fleet(10));
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(500), AgentFilter::default()),
            10,
        )
        .unwrap();
        assert!(result.agents.is_empty());
        assert_eq!(result.total_count, Some(10));
        assert!(!result.has_more());
        assert_eq!(result.status, ScanStatus::Exhausted);
    }

    #[test]
    fn test_unfiltered_is_idempotent() {
        let mut source = StubSource::new(fleet(150));
        let req = request(50, PageCursor::Offset(50), AgentFilter::default());

        let first = fetch_agents_paginated(&mut source, &req, 10).unwrap();
        let second = fetch_agents_paginated(&mut source, &req, 10).unwrap();

        let first_ids: Vec<_> = first.agents.iter().map(|a| a.id).collect();
        let second_ids: Vec<_> = second.agents.iter().map(|a| a.id).collect();
        assert_eq!(first_ids, second_ids);
        assert_eq!(first.total_count, second.total_count);
        assert_eq!(first.status, second.status);
        assert_eq!(first.pages_fetched, second.pages_fetched);
    }

    // ---- Filtered scanning -------------------------------------------------

    /// 150 agents with three `rag` agents scattered across the first three
    /// upstream pages.
    fn scattered_rag_fleet() -> Vec<Agent> {
        let mut agents = fleet(150);
        for position in [10usize, 60, 120] {
            agents[position] = agent(
                position as u32,
                &format!("Rag {:03}", position),
                "rag",
            );
        }
        agents
    }

    #[test]
    fn test_filtered_gathers_scattered_matches() {
        let mut source = StubSource::new(scattered_rag_fleet());
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(0), type_filter("rag")),
            10,
        )
        .unwrap();

        assert_eq!(result.agents.len(), 3);
        assert!(result.agents.iter().all(|a| a.agent_type == "rag"));
        assert_eq!(result.total_count, None);
        assert!(result.has_filters());
        // Three full pages, then the empty page that proves exhaustion.
        assert_eq!(result.pages_fetched, 4);
        assert_eq!(source.calls, 4);
        assert_eq!(result.status, ScanStatus::Exhausted);
        assert!(!result.has_more());
        assert_eq!(result.next_offset(), None);
    }

    #[test]
    fn test_filtered_zero_matches_hits_cap() {
        let mut source = StubSource::new(fleet(150));
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(0), type_filter("nonexistent")),
            2,
        )
        .unwrap();

        assert!(result.agents.is_empty());
        assert_eq!(source.calls, 2);
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(result.status, ScanStatus::CapReached);
        // Cap-hit is not the end of the data: the caller may continue.
        assert!(result.has_more());
        assert_eq!(result.next_offset(), Some(100));
    }

    #[test]
    fn test_filtered_scan_respects_cap_with_large_dataset() {
        let mut source = StubSource::new(fleet(500));
        let result = fetch_agents_paginated(
            &mut source,
            &request(10, PageCursor::Offset(0), type_filter("nonexistent")),
            5,
        )
        .unwrap();
        assert_eq!(source.calls, 5);
        assert_eq!(result.pages_fetched, 5);
        assert_eq!(result.next_scan_offset, 50);
    }

    #[test]
    fn test_filtered_window_truncates_to_limit() {
        // Every agent matches, so the very first page fills the window.
        let mut source = StubSource::new(fleet(150));
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(0), type_filter("base")),
            10,
        )
        .unwrap();

        assert_eq!(result.agents.len(), 50);
        assert_eq!(result.pages_fetched, 1);
        assert_eq!(result.status, ScanStatus::Complete);
        assert!(result.has_more());
        assert_eq!(result.next_offset(), Some(50));
    }

    #[test]
    fn test_filtered_sparse_matches_need_several_pages() {
        // Upstream pages hold 3 rows each; one match lands on each of the
        // first three pages, so the window of 3 fills on page 3.
        let mut agents = fleet(100);
        for position in [2usize, 4, 8, 20] {
            agents[position] = agent(position as u32, &format!("Rag {}", position), "rag");
        }
        let mut source = StubSource::new(agents);

        let result = fetch_agents_paginated(
            &mut source,
            &request(3, PageCursor::Offset(0), type_filter("rag")),
            10,
        )
        .unwrap();

        assert_eq!(result.agents.len(), 3);
        assert_eq!(result.pages_fetched, 3);
        assert_eq!(result.status, ScanStatus::Complete);
        assert_eq!(result.next_offset(), Some(9));
    }

    #[test]
    fn test_filtered_window_filled_by_final_short_page() {
        // 17 rows; the second page is short but pushes matches to the limit.
        let mut agents = Vec::new();
        for n in 0..17u32 {
            let ty = if n < 4 || n >= 10 { "rag" } else { "tool" };
            agents.push(agent(n, &format!("Agent {:03}", n), ty));
        }
        let mut source = StubSource::new(agents);

        let result = fetch_agents_paginated(
            &mut source,
            &request(10, PageCursor::Offset(0), type_filter("rag")),
            10,
        )
        .unwrap();

        // 4 matches from page one, 7 from the short page two, truncated.
        assert_eq!(result.agents.len(), 10);
        assert_eq!(result.status, ScanStatus::Complete);
        assert!(result.has_more());
        assert_eq!(result.next_offset(), Some(17));
    }

    #[test]
    fn test_filtered_continuation_finds_the_end() {
        // All 30 rows match; a window of 30 fills exactly as the data ends,
        // so only the next continuation proves exhaustion.
        let agents: Vec<Agent> = (0..30).map(|n| agent(n, &format!("R {}", n), "rag")).collect();
        let mut source = StubSource::new(agents);

        let first = fetch_agents_paginated(
            &mut source,
            &request(30, PageCursor::Offset(0), type_filter("rag")),
            10,
        )
        .unwrap();
        assert_eq!(first.agents.len(), 30);
        assert_eq!(first.status, ScanStatus::Complete);
        assert!(first.has_more());
        let resume = first.next_offset().unwrap();
        assert_eq!(resume, 30);

        let second = fetch_agents_paginated(
            &mut source,
            &request(30, PageCursor::Offset(resume), type_filter("rag")),
            10,
        )
        .unwrap();
        assert!(second.agents.is_empty());
        assert_eq!(second.status, ScanStatus::Exhausted);
        assert!(!second.has_more());
    }

    #[test]
    fn test_filtered_scan_stops_at_offset_ceiling() {
        // Full pages all the way up: the third fetch would push the scan
        // cursor past u32::MAX, which ends the scan like exhaustion.
        let mut source = EndlessSource { calls: 0 };
        let result = fetch_agents_paginated(
            &mut source,
            &request(
                50,
                PageCursor::Offset(u32::MAX - 120),
                type_filter("nonexistent"),
            ),
            10,
        )
        .unwrap();

        assert!(result.agents.is_empty());
        assert_eq!(result.pages_fetched, 3);
        assert_eq!(source.calls, 3);
        assert_eq!(result.status, ScanStatus::Exhausted);
        assert!(!result.has_more());
        assert_eq!(result.next_offset(), None);
    }

    #[test]
    fn test_filtered_scan_starts_at_requested_offset() {
        let mut source = StubSource::new(scattered_rag_fleet());
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(50), type_filter("rag")),
            10,
        )
        .unwrap();

        // Only the matches at positions 60 and 120 are ahead of offset 50.
        assert_eq!(result.agents.len(), 2);
        assert_eq!(result.offset, 50);
    }

    // ---- Validation --------------------------------------------------------

    #[test]
    fn test_zero_limit_rejected_without_upstream_calls() {
        let mut source = StubSource::new(fleet(10));
        let err = fetch_agents_paginated(
            &mut source,
            &request(0, PageCursor::Offset(0), AgentFilter::default()),
            10,
        )
        .unwrap_err();

        assert!(matches!(err, AbError::InvalidRequest(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn test_zero_page_rejected_without_upstream_calls() {
        let mut source = StubSource::new(fleet(10));
        let err = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Page(0), AgentFilter::default()),
            10,
        )
        .unwrap_err();

        assert!(matches!(err, AbError::InvalidRequest(_)));
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn test_page_with_filter_rejected_without_upstream_calls() {
        let mut source = StubSource::new(fleet(10));
        let err = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Page(2), type_filter("rag")),
            10,
        )
        .unwrap_err();

        assert!(matches!(err, AbError::InvalidRequest(_)));
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn test_huge_page_number_rejected() {
        let mut source = StubSource::new(fleet(10));
        let err = fetch_agents_paginated(
            &mut source,
            &request(100, PageCursor::Page(u32::MAX), AgentFilter::default()),
            10,
        )
        .unwrap_err();

        assert!(matches!(err, AbError::InvalidRequest(_)));
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn test_offset_near_max_rejected_without_upstream_calls() {
        let mut source = StubSource::new(fleet(10));
        let err = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(u32::MAX), AgentFilter::default()),
            10,
        )
        .unwrap_err();

        assert!(matches!(err, AbError::InvalidRequest(_)));
        assert_eq!(source.calls, 0);

        // The last window that still ends inside the offset range is served.
        let result = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(u32::MAX - 50), AgentFilter::default()),
            10,
        )
        .unwrap();
        assert!(result.agents.is_empty());
        assert_eq!(result.status, ScanStatus::Exhausted);
    }

    // ---- Error propagation -------------------------------------------------

    #[test]
    fn test_upstream_error_propagates_unfiltered() {
        let mut source = StubSource::new(fleet(10));
        source.fail_on_call = Some(1);
        let err = fetch_agents_paginated(
            &mut source,
            &request(5, PageCursor::Offset(0), AgentFilter::default()),
            10,
        )
        .unwrap_err();
        assert!(matches!(err, AbError::Server { status: 502, .. }));
    }

    #[test]
    fn test_upstream_error_aborts_filtered_scan() {
        let mut source = StubSource::new(fleet(150));
        source.fail_on_call = Some(2);
        let err = fetch_agents_paginated(
            &mut source,
            &request(50, PageCursor::Offset(0), type_filter("nonexistent")),
            10,
        )
        .unwrap_err();

        assert!(matches!(err, AbError::Server { status: 502, .. }));
        // The failing call was made, and nothing after it.
        assert_eq!(source.calls, 2);
    }

    // ---- Result serialization ---------------------------------------------

    #[test]
    fn test_result_serializes_for_structured_output() {
        let mut source = StubSource::new(fleet(10));
        let result = fetch_agents_paginated(
            &mut source,
            &request(5, PageCursor::Offset(0), AgentFilter::default()),
            10,
        )
        .unwrap();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["total_count"], 10);
        assert_eq!(value["status"], "complete");
        assert_eq!(value["agents"].as_array().unwrap().len(), 5);
    }
}
