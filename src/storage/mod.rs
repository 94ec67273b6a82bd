pub mod models;
pub mod schema;
pub mod sqlite;

use crate::errors::Result;
use models::{NewSubmission, Submission};

pub trait SubmissionStore {
    fn insert(&self, submission: NewSubmission) -> Result<Submission>;
    fn get_by_id(&self, id: i64) -> Result<Submission>;
    fn fetch_random(&self) -> Result<Option<Submission>>;
    fn count(&self) -> Result<i64>;
}
