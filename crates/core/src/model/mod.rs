mod card;
mod ids;
mod profile;
mod progress;
pub mod session;

pub use ids::{SessionId, StudentId};

pub use card::{CardError, TenseExamples, VocabularyCard};
pub use profile::StudentProfile;
pub use progress::{ProgressRecord, SessionProgress};
pub use session::{default_staleness_window, SessionError, VocabularySession};
