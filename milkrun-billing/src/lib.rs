pub mod calendar;
pub mod extras;
pub mod index;
pub mod reconciliation;
pub mod service;
pub mod settlement;
pub mod statement;
pub mod summary;

pub use calendar::{CalendarGenerator, DayStatus, DeliveryCalendar};
pub use reconciliation::{reconcile, BillInputs, BillStatus};
pub use service::LedgerService;
pub use settlement::{apply_payment, PaymentReceipt};
pub use statement::{CustomerStatement, PeriodFacts};
pub use summary::{BillView, MonthlySummary};
