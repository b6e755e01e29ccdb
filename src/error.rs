use crate::{data::student::StudentId, maud_conveniences::alert};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use snafu::Snafu;
use std::{net::AddrParseError, path::PathBuf};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse server address {:?}", original))]
    ParseAddress {
        source: AddrParseError,
        original: String,
    },
    #[snafu(display("Unable to parse URL {:?}", original))]
    ParseUrl {
        source: url::ParseError,
        original: String,
    },
    #[snafu(display("Unable to parse boolean flag `{}` from {:?}", name, original))]
    ParseFlag {
        name: &'static str,
        original: String,
    },
    #[snafu(display("Error reading session file {}", path.display()))]
    ReadSessionFile {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error writing session file {}", path.display()))]
    WriteSessionFile {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error serialising with rmp_serde"))]
    RmpSerdeEncode { source: rmp_serde::encode::Error },
    #[snafu(display("Error deserialising with rmp_serde"))]
    RmpSerdeDecode { source: rmp_serde::decode::Error },
    #[snafu(display("Error talking to the student directory"))]
    DirectoryRequest { source: reqwest::Error },
    #[snafu(display("Student directory rejected the call with status {}", status))]
    DirectoryStatus { status: reqwest::StatusCode },
    #[snafu(display("Unable to find student with ID: {}", id))]
    StudentNotFound { id: StudentId },
    #[snafu(display("Not signed in"))]
    Unauthenticated,
    #[snafu(display("{} must not be empty", field))]
    EmptyField { field: &'static str },
    #[snafu(display("Unknown school {:?}", original))]
    UnknownSchool { original: String },
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const NA: StatusCode = StatusCode::UNAUTHORIZED; //not allowed
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //upstream broke

        let status_code = match &self {
            Self::BadEnvVar { .. } | Self::ParseAddress { .. } | Self::ParseFlag { .. } => ISE,
            Self::ParseUrl { .. } => ISE,
            Self::ReadSessionFile { .. } | Self::WriteSessionFile { .. } => ISE,
            Self::RmpSerdeEncode { .. } => ISE,
            Self::RmpSerdeDecode { .. } => BI,
            Self::DirectoryRequest { .. } | Self::DirectoryStatus { .. } => BG,
            Self::StudentNotFound { .. } => NF,
            Self::Unauthenticated => NA,
            Self::EmptyField { .. } | Self::UnknownSchool { .. } => BI,
        };

        error!(?self, "Error!");
        (
            status_code,
            Html(alert("Roster Error", self.to_string()).into_string()),
        )
            .into_response()
    }
}
