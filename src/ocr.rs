use crate::error::{OcrError, Result};
use crate::loader::{self, UploadField};
use crate::normalize;
use crate::store::CredentialStore;
use crate::token::AccessTokenProvider;
use crate::transport::OcrTransport;
use crate::types::{NormalizedRecord, SourceFile};
use std::sync::Arc;

const MULTIPLE_INVOICE_PATH: &str = "/rest/2.0/ocr/v1/multiple_invoice";
const TEMPLATE_PATH: &str = "/rest/2.0/solution/v1/iocr/recognise/finance";

/// Sends one document to the OCR service and normalises the answer.
///
/// Holds no per-call state, so a single instance can serve concurrent calls.
pub struct Recognizer<T: ?Sized, S: ?Sized> {
    api_base: String,
    transport: Arc<T>,
    tokens: AccessTokenProvider<T, S>,
}

impl<T, S> Recognizer<T, S>
where
    T: OcrTransport + ?Sized,
    S: CredentialStore + ?Sized,
{
    pub fn new(api_base: impl Into<String>, transport: Arc<T>, store: Arc<S>) -> Self {
        let api_base = api_base.into();
        Self {
            tokens: AccessTokenProvider::new(api_base.clone(), transport.clone(), store),
            api_base,
            transport,
        }
    }

    /// Recognise `file`. A non-empty `template_sign` routes to the custom
    /// template endpoint; otherwise the generic multi-invoice classifier is used.
    pub fn recognize(
        &self,
        file: &SourceFile,
        explicit_image_data: Option<&str>,
        template_sign: Option<&str>,
    ) -> Result<NormalizedRecord> {
        // Payload first: an unsupported or unreadable file never costs a token call.
        let (field, content) = loader::resolve_payload(file, explicit_image_data)?;
        let token = self.tokens.access_token()?;

        match template_sign.map(str::trim).filter(|s| !s.is_empty()) {
            Some(sign) => self.recognize_template(&file.name, &token, sign, &content),
            None => self.recognize_generic(&file.name, &token, field, &content),
        }
    }

    fn recognize_generic(
        &self,
        name: &str,
        token: &str,
        field: UploadField,
        content: &str,
    ) -> Result<NormalizedRecord> {
        log::info!("[ocr] Multi-invoice recognition for {} ({})", name, field.form_key());
        let url = format!("{}{}", self.api_base, MULTIPLE_INVOICE_PATH);
        let response = self
            .transport
            .post_form(
                &url,
                &[("access_token", token)],
                &[(field.form_key(), content), ("verify_parameter", "false")],
            )
            .map_err(|e| OcrError::Recognition(e.to_string()))?;
        let record = normalize::normalize_generic(&response);
        if let Err(e) = &record {
            log::warn!("[ocr] {} failed: {}", name, e);
        }
        record
    }

    fn recognize_template(
        &self,
        name: &str,
        token: &str,
        template_sign: &str,
        content: &str,
    ) -> Result<NormalizedRecord> {
        log::info!("[ocr] Template recognition for {}", name);
        let url = format!("{}{}", self.api_base, TEMPLATE_PATH);
        let response = self
            .transport
            .post_form(
                &url,
                &[("access_token", token)],
                &[("templateSign", template_sign), ("image", content)],
            )
            .map_err(|e| OcrError::Recognition(e.to_string()))?;
        let record = normalize::normalize_template(&response);
        if let Err(e) = &record {
            log::warn!("[ocr] {} failed: {}", name, e);
        }
        record
    }
}
