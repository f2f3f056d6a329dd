#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back with fewer listings than requested.
    ShortPage,
    /// The offset reached `max_page_number`.
    CeilingReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Fetching { offset: u32 },
    Done(StopReason),
}

/// Decides which offset to fetch next. Moves forward only.
#[derive(Debug, Clone)]
pub struct Pagination {
    state: PageState,
    page_size: u32,
    ceiling: u32,
}

impl Pagination {
    pub fn new(page_size: u32, ceiling: u32) -> Self {
        let state = if ceiling == 0 {
            PageState::Done(StopReason::CeilingReached)
        } else {
            PageState::Fetching { offset: 0 }
        };
        Self {
            state,
            page_size,
            ceiling,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Feed back the listing count of the page just fetched.
    pub fn advance(&mut self, listings_on_page: usize) -> PageState {
        if let PageState::Fetching { offset } = self.state {
            self.state = if listings_on_page < self.page_size as usize {
                PageState::Done(StopReason::ShortPage)
            } else {
                let next = offset.saturating_add(self.page_size);
                if next >= self.ceiling {
                    PageState::Done(StopReason::CeilingReached)
                } else {
                    PageState::Fetching { offset: next }
                }
            };
        }
        self.state
    }
}
