#![allow(dead_code)]

use invoice_ocr_lib::error::TransportError;
use invoice_ocr_lib::store::MemoryCredentialStore;
use invoice_ocr_lib::transport::OcrTransport;
use invoice_ocr_lib::{Credentials, TemplateSignature};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const API_BASE: &str = "https://ocr.test";

#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl Call {
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

type Responder = dyn Fn(&Call) -> Result<Value, TransportError> + Send + Sync;

/// Answers the token endpoint with a fixed token and hands every other
/// request to `respond`. Records every call.
pub struct Scripted {
    respond: Box<Responder>,
    pub calls: Mutex<Vec<Call>>,
}

impl Scripted {
    pub fn new(
        respond: impl Fn(&Call) -> Result<Value, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every recognition request gets the same answer.
    pub fn always(response: Value) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn recognition_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !c.url.ends_with("/oauth/2.0/token"))
            .collect()
    }
}

impl OcrTransport for Scripted {
    fn post_form(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let owned = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
        };
        let call = Call {
            url: url.to_string(),
            query: owned(query),
            form: owned(form),
        };
        self.calls.lock().unwrap().push(call.clone());
        if url.ends_with("/oauth/2.0/token") {
            return Ok(json!({"access_token": "token-123", "expires_in": 2592000}));
        }
        (self.respond)(&call)
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        api_key: "ak".into(),
        secret_key: "sk".into(),
        templates: vec![TemplateSignature {
            template_name: "差旅模板".into(),
            template_sign: "sign-abc".into(),
        }],
    }
}

pub fn store_with_keys() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_credentials(credentials()))
}

pub fn words(value: &str) -> Value {
    json!([{ "word": value }])
}

pub fn generic_response(tag: &str, result: Value) -> Value {
    json!({
        "log_id": 1,
        "words_result_num": 1,
        "words_result": [{ "type": tag, "result": result }]
    })
}

pub fn taxi_response() -> Value {
    generic_response(
        "taxi_receipt",
        json!({
            "InvoiceCode": words("111001981001"),
            "InvoiceNum": words("12345678"),
            "TotalFare": words("¥23.00"),
            "Date": words("2023-05-01"),
        }),
    )
}
