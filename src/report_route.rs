use std::io;
use rocket::{
    State,
    serde::json::{self, Json},
};

use crate::error::ReportError;
use crate::report_sys::{Report, ReportStats, ReportSubmission, ReportSys};


type JsonResult<T> = Result<Json<T>, ReportError>;


pub const FILE_UPLOAD_LIMIT: usize = (8 * 1024 * 1024 / 3) * 4; // chars


fn reject_body(err: json::Error<'_>) -> ReportError {
    match err {
        // Rocket reports an exceeded data limit as an early EOF.
        json::Error::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            ReportError::TooLarge(err.to_string())
        },
        json::Error::Io(err) => ReportError::MalformedBody(err.to_string()),
        json::Error::Parse(_, err) if err.is_data() => ReportError::InvalidPayload(err.to_string()),
        json::Error::Parse(_, err) => ReportError::MalformedBody(err.to_string()),
    }
}


#[post("/reportes", data = "<submission>")]
pub async fn post_report(submission: Result<Json<ReportSubmission>, json::Error<'_>>,
    sys: &State<ReportSys>) -> JsonResult<Report> {

    let submission = submission.map_err(reject_body)?;

    sys.create_report(submission.into_inner()).await.map(Json)
}

#[get("/reportes")]
pub async fn get_reports(sys: &State<ReportSys>) -> JsonResult<Vec<Report>> {
    sys.list_reports().await.map(Json)
}

#[get("/stats")]
pub async fn get_stats(sys: &State<ReportSys>) -> JsonResult<ReportStats> {
    sys.stats().await.map(Json)
}
