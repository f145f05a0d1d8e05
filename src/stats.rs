/// Counters collected while scanning a routing snapshot
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouteStats {
    pub lines_read: u64,
    pub route_lines: u64,
    pub as_set_lines: u64,
    pub paths_recorded: u64,
}

impl RouteStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_lines(&mut self) {
        self.lines_read += 1;
    }

    pub fn inc_routes(&mut self) {
        self.route_lines += 1;
    }

    pub fn inc_as_sets(&mut self) {
        self.as_set_lines += 1;
    }

    pub fn inc_paths(&mut self) {
        self.paths_recorded += 1;
    }

    /// Route lines whose path was too short to name a peer
    pub fn short_paths(&self) -> u64 {
        self.route_lines - self.paths_recorded
    }
}
