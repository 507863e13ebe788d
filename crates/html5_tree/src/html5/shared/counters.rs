//! Optional counters for instrumentation.

#[derive(Clone, Debug, Default)]
pub struct Counters {
    pub tokens_processed: u64,
    pub parse_errors: u64,
    pub adoption_agency_runs: u64,
    pub max_open_elements: u32,
    pub max_active_formatting: u32,
}
