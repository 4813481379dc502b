/// Monotonic request tokens; only the latest submission may deliver a result.
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    last_issued: u32,
    pending: Option<u32>,
}

impl RequestTracker {
    pub fn begin(&mut self) -> u32 {
        self.last_issued = self.last_issued.wrapping_add(1);
        self.pending = Some(self.last_issued);
        self.last_issued
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// True if `token` is the pending request, which is then cleared.
    pub fn finish(&mut self, token: u32) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
