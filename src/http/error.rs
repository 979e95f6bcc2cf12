use rouille::Response;

use crate::present::error::ViewError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unprocessable(String),
    BadGateway(String),
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::Transport(_) => ApiError::BadGateway(err.to_string()),

            ViewError::UnsupportedCategory(_) => ApiError::BadRequest(err.to_string()),

            ViewError::EmptyResult { .. } | ViewError::InsufficientData => {
                ApiError::Unprocessable(err.to_string())
            }
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unprocessable(_) => 422,
            ApiError::BadGateway(_) => 502,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::BadRequest(msg) | ApiError::Unprocessable(msg) | ApiError::BadGateway(msg) => {
                Response::text(msg).with_status_code(status)
            }
        }
    }
}
