//! Table rendering, pagination summaries and the interactive `--more` loop
//! for agent listings.

use std::io::{self, Write};

use crate::api::pagination::{
    fetch_agents_paginated, AgentFilter, AgentSource, PageCursor, PageRequest, PaginatedResult,
    ScanStatus,
};
use crate::error::Result;
use crate::models::agent::Agent;
use crate::output::truncate;

pub fn print_agent_table(agents: &[Agent]) {
    println!(
        "{:<38} {:<30} {:<8} {:<10} {:<10}",
        "ID", "NAME", "TYPE", "STATUS", "CREATED"
    );
    println!("{}", "-".repeat(100));
    for agent in agents {
        println!(
            "{:<38} {:<30} {:<8} {:<10} {:<10}",
            agent.id,
            truncate(&agent.name, 28),
            truncate(&agent.agent_type, 8),
            truncate(&agent.status, 10),
            agent.created_date()
        );
    }
}

/// Human-readable filter criteria, e.g. `type: rag, name: *calc*`.
pub fn describe_filter(filter: &AgentFilter) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(agent_type) = filter.agent_type.as_deref() {
        if !agent_type.is_empty() {
            parts.push(format!("type: {}", agent_type));
        }
    }
    if let Some(pattern) = filter.name_pattern.as_deref() {
        if !pattern.is_empty() {
            parts.push(format!("name: {}", pattern));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Pagination info shown below the table. Unfiltered results get exact page
/// math; filtered results get `???` for the total, the echoed criteria, the
/// scan effort, and a continuation note when the scan stopped at the cap.
pub fn pagination_summary(result: &PaginatedResult) -> String {
    let start = result.offset as u64 + 1;
    let end = result.offset as u64 + result.agents.len() as u64;

    match result.total_count {
        Some(total) => {
            let current_page = result.offset / result.limit + 1;
            let total_pages = if total > 0 {
                (total + result.limit as u64 - 1) / result.limit as u64
            } else {
                1
            };
            format!(
                "Page: {}/{} | Showing: {}-{} of {} | Page size: {}",
                current_page, total_pages, start, end, total, result.limit
            )
        }
        None => {
            let criteria = match describe_filter(&result.filter) {
                Some(text) => format!(" (filtered by {})", text),
                None => " (filtered)".to_string(),
            };
            let mut lines = vec![
                format!(
                    "Showing: {}-{} of ???{} | Page size: {}",
                    start, end, criteria, result.limit
                ),
                format!("Scanned {} upstream page(s).", result.pages_fetched),
            ];
            if result.status == ScanStatus::CapReached {
                lines.push(format!(
                    "Scan stopped at the page cap; more matches may exist past offset {}.",
                    result.next_scan_offset
                ));
            }
            lines.join("\n")
        }
    }
}

pub fn show_pagination_info(result: &PaginatedResult) {
    println!();
    println!("{}", pagination_summary(result));
}

/// The exact command that fetches the next window, or `None` at the end of
/// the results. Filters and page size are preserved; `use_page` keeps the
/// `--page` style when the request was paged.
pub fn next_page_command(result: &PaginatedResult, use_page: bool) -> Option<String> {
    let next_offset = result.next_offset()?;

    let mut cmd = if use_page {
        let next_page = next_offset / result.limit + 1;
        format!("ab agents list --page {} -l {}", next_page, result.limit)
    } else {
        format!("ab agents list --offset {} -l {}", next_offset, result.limit)
    };
    if let Some(agent_type) = result.filter.agent_type.as_deref() {
        if !agent_type.is_empty() {
            cmd.push_str(&format!(" --type {}", agent_type));
        }
    }
    if let Some(pattern) = result.filter.name_pattern.as_deref() {
        if !pattern.is_empty() {
            cmd.push_str(&format!(" --name \"{}\"", pattern));
        }
    }
    Some(cmd)
}

pub fn show_next_page_command(result: &PaginatedResult, use_page: bool) {
    match next_page_command(result, use_page) {
        Some(cmd) => println!("Next page: {}", cmd),
        None => println!("(End of results)"),
    }
}

/// Interactive paging: render a window, prompt, continue from the resume
/// cursor until the user quits (`q` or EOF) or the results end. Fetch errors
/// abort the loop and propagate.
pub fn run_more_loop<S: AgentSource>(
    source: &mut S,
    first: &PageRequest,
    max_filter_pages: u32,
) -> Result<()> {
    let mut request = first.clone();

    loop {
        let result = fetch_agents_paginated(source, &request, max_filter_pages)?;

        if result.agents.is_empty() {
            println!("No agents found.");
        } else {
            print_agent_table(&result.agents);
        }
        show_pagination_info(&result);

        let next = match result.next_offset() {
            Some(next) => next,
            None => {
                println!("(End of results)");
                return Ok(());
            }
        };

        print!("Press Enter for the next page, q to quit: ");
        io::stdout().flush()?;
        let mut input = String::new();
        let bytes_read = io::stdin().read_line(&mut input)?;
        if bytes_read == 0 || input.trim().eq_ignore_ascii_case("q") {
            return Ok(());
        }

        // Continue from the scan cursor, never from zero. Filtered scans
        // resume past every row already examined.
        request.cursor = PageCursor::Offset(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(
        count: usize,
        offset: u32,
        limit: u32,
        total: Option<u64>,
        filter: AgentFilter,
        pages_fetched: u32,
        status: ScanStatus,
        next_scan_offset: u32,
    ) -> PaginatedResult {
        use crate::models::agent::Agent;
        use uuid::Uuid;

        let agents = (0..count)
            .map(|n| Agent {
                id: Uuid::from_u128(n as u128),
                agent_type: "base".to_string(),
                name: format!("Agent {}", n),
                description: String::new(),
                status: "CREATED".to_string(),
                is_global_agent: false,
                current_version_id: None,
                created_at: "2025-01-01T00:00:00Z".to_string(),
                created_by: String::new(),
                modified_at: String::new(),
                modified_by: None,
            })
            .collect();

        PaginatedResult {
            agents,
            offset,
            limit,
            total_count: total,
            filter,
            pages_fetched,
            status,
            next_scan_offset,
        }
    }

    #[test]
    fn test_summary_unfiltered_middle_page() {
        let result = result(
            50,
            50,
            50,
            Some(150),
            AgentFilter::default(),
            1,
            ScanStatus::Complete,
            100,
        );
        assert_eq!(
            pagination_summary(&result),
            "Page: 2/3 | Showing: 51-100 of 150 | Page size: 50"
        );
    }

    #[test]
    fn test_summary_unfiltered_partial_last_page() {
        let result = result(
            37,
            0,
            50,
            Some(37),
            AgentFilter::default(),
            1,
            ScanStatus::Exhausted,
            37,
        );
        assert_eq!(
            pagination_summary(&result),
            "Page: 1/1 | Showing: 1-37 of 37 | Page size: 50"
        );
    }

    #[test]
    fn test_summary_unfiltered_empty_listing() {
        let result = result(
            0,
            0,
            50,
            Some(0),
            AgentFilter::default(),
            1,
            ScanStatus::Exhausted,
            0,
        );
        assert_eq!(
            pagination_summary(&result),
            "Page: 1/1 | Showing: 1-0 of 0 | Page size: 50"
        );
    }

    #[test]
    fn test_summary_filtered_shows_unknown_total_and_criteria() {
        let filter = AgentFilter::new(Some("rag".to_string()), Some("*doc*".to_string()));
        let result = result(3, 0, 50, None, filter, 4, ScanStatus::Exhausted, 150);
        let summary = pagination_summary(&result);

        assert!(summary.contains("of ??? (filtered by type: rag, name: *doc*)"));
        assert!(summary.contains("Scanned 4 upstream page(s)."));
        assert!(!summary.contains("page cap"));
    }

    #[test]
    fn test_summary_filtered_cap_hit_mentions_continuation() {
        let filter = AgentFilter::new(Some("rag".to_string()), None);
        let result = result(0, 0, 50, None, filter, 2, ScanStatus::CapReached, 100);
        let summary = pagination_summary(&result);

        assert!(summary.contains("Scan stopped at the page cap"));
        assert!(summary.contains("offset 100"));
    }

    #[test]
    fn test_next_command_offset_style() {
        let result = result(
            50,
            0,
            50,
            Some(150),
            AgentFilter::default(),
            1,
            ScanStatus::Complete,
            50,
        );
        assert_eq!(
            next_page_command(&result, false).as_deref(),
            Some("ab agents list --offset 50 -l 50")
        );
    }

    #[test]
    fn test_next_command_page_style() {
        let result = result(
            50,
            50,
            50,
            Some(150),
            AgentFilter::default(),
            1,
            ScanStatus::Complete,
            100,
        );
        assert_eq!(
            next_page_command(&result, true).as_deref(),
            Some("ab agents list --page 3 -l 50")
        );
    }

    #[test]
    fn test_next_command_preserves_filters() {
        let filter = AgentFilter::new(Some("rag".to_string()), Some("*calc*".to_string()));
        let result = result(50, 0, 50, None, filter, 3, ScanStatus::Complete, 150);
        assert_eq!(
            next_page_command(&result, false).as_deref(),
            Some("ab agents list --offset 150 -l 50 --type rag --name \"*calc*\"")
        );
    }

    #[test]
    fn test_next_command_none_at_end() {
        let result = result(
            37,
            0,
            50,
            Some(37),
            AgentFilter::default(),
            1,
            ScanStatus::Exhausted,
            37,
        );
        assert!(next_page_command(&result, false).is_none());
    }

    #[test]
    fn test_describe_filter_formats() {
        assert_eq!(describe_filter(&AgentFilter::default()), None);
        assert_eq!(
            describe_filter(&AgentFilter::new(Some("tool".to_string()), None)).as_deref(),
            Some("type: tool")
        );
        assert_eq!(
            describe_filter(&AgentFilter::new(None, Some("calc".to_string()))).as_deref(),
            Some("name: calc")
        );
    }
}
