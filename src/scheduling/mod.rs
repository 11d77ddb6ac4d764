mod scanner;
mod scheduler;

pub use scanner::DueReminderScanner;
pub use scheduler::SchedulerLoop;
