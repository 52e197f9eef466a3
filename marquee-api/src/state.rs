use marquee_core::TicketHoldingService;

#[derive(Clone)]
pub struct AppState {
    pub holds: TicketHoldingService,
}
