use crate::models::{FeatureVector, PassengerForm};
use crate::startup::AppState;
use askama::Template;
use axum::{
    body::to_bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::header,
};

/// Upper bound on a urlencoded form body; four numeric fields fit easily.
const MAX_FORM_BYTES: usize = 64 * 1024;

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub result: Option<String>,
}

pub async fn form_page() -> FormTemplate {
    FormTemplate { result: None }
}

/// Body decoding, conversion and prediction failures are all shown on the
/// page; the response is always the rendered form.
pub async fn form_submit(State(state): State<AppState>, req: Request) -> FormTemplate {
    let outcome = read_passenger_form(req)
        .await
        .and_then(|form| FeatureVector::from_form(&form).map_err(anyhow::Error::from))
        .and_then(|features| {
            state
                .classifier
                .predict(&features)
                .map_err(anyhow::Error::from)
        });

    let result = match outcome {
        Ok(prediction) => {
            tracing::info!(label = prediction.label, "Form prediction served");
            if prediction.survived() {
                "Prediction: Survived".to_string()
            } else {
                "Prediction: Did not survive".to_string()
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Form prediction rejected");
            format!("Error: {}", e)
        }
    };

    FormTemplate {
        result: Some(result),
    }
}

enum FormEncoding {
    UrlEncoded,
    Multipart,
    Other,
}

fn form_encoding(req: &Request) -> FormEncoding {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        FormEncoding::UrlEncoded
    } else if content_type.starts_with("multipart/form-data") {
        FormEncoding::Multipart
    } else {
        FormEncoding::Other
    }
}

/// Decode submitted fields from a urlencoded or multipart body. Any other
/// content type carries no form fields.
async fn read_passenger_form(req: Request) -> anyhow::Result<PassengerForm> {
    match form_encoding(&req) {
        FormEncoding::UrlEncoded => {
            let bytes = to_bytes(req.into_body(), MAX_FORM_BYTES)
                .await
                .map_err(|e| anyhow::anyhow!("could not read form body: {}", e))?;
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&bytes)
                .map_err(|e| anyhow::anyhow!("invalid form body: {}", e))?;
            Ok(PassengerForm::from_pairs(pairs))
        }
        FormEncoding::Multipart => {
            let mut multipart = Multipart::from_request(req, &())
                .await
                .map_err(|e| anyhow::anyhow!("invalid multipart form: {}", e.body_text()))?;

            let mut pairs = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| anyhow::anyhow!("invalid multipart form: {}", e.body_text()))?
            {
                // File uploads are not form values.
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| anyhow::anyhow!("invalid multipart form: {}", e.body_text()))?;
                pairs.push((name, value));
            }
            Ok(PassengerForm::from_pairs(pairs))
        }
        FormEncoding::Other => Ok(PassengerForm::default()),
    }
}
