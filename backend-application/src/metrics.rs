use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    requests: AtomicU64,
    search_requests: AtomicU64,
    reindexed_documents: AtomicU64,
    imported_days: AtomicU64,
}

impl Metrics {
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.search_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reindexed(&self, count: usize) {
        self.reindexed_documents
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_imported(&self, count: usize) {
        self.imported_days.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let requests = self.requests.load(Ordering::Relaxed);
        let searches = self.search_requests.load(Ordering::Relaxed);
        let reindexed = self.reindexed_documents.load(Ordering::Relaxed);
        let imported = self.imported_days.load(Ordering::Relaxed);

        format!(
            "# HELP dodualm_requests_total The total number of CRUD requests for all types.\n\
# TYPE dodualm_requests_total counter\n\
dodualm_requests_total {}\n\
# TYPE dodualm_search_requests_total counter\n\
dodualm_search_requests_total {}\n\
# TYPE dodualm_reindexed_documents_total counter\n\
dodualm_reindexed_documents_total {}\n\
# TYPE dodualm_imported_days_total counter\n\
dodualm_imported_days_total {}\n",
            requests, searches, reindexed, imported
        )
    }
}
