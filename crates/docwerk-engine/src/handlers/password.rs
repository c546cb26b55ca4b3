// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Password wrapper: a notice document that carries a salted password digest
// in its keywords. The wrapped content is not encrypted and cannot be
// recovered from the wrapper.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{JobOutput, Operation, OperationDetails, OperationKind};
use docwerk_document::{MetadataField, NoticeWriter, PdfDocument};
use docwerk_security::{PasswordDigest, fingerprint};
use tracing::{info, instrument, warn};

use super::{finish, misrouted};
use crate::progress::ProgressReporter;
use crate::registry::OperationHandler;

const WRAPPER_TAG: &str = "DOCWERK-PROTECTED";
const FIELD_SEPARATOR: char = ';';

/// The keyword payload of a wrapper document:
/// `DOCWERK-PROTECTED;hash=<salt$digest>;data=<base64 fragment>`.
#[derive(Debug)]
struct WrapperTag {
    digest: PasswordDigest,
    fragment: Vec<u8>,
}

impl WrapperTag {
    fn encode(&self) -> String {
        format!(
            "{WRAPPER_TAG}{FIELD_SEPARATOR}hash={}{FIELD_SEPARATOR}data={}",
            self.digest.encode(),
            BASE64.encode(&self.fragment)
        )
    }

    fn parse(keywords: &str) -> Result<Self> {
        let mut fields = keywords.split(FIELD_SEPARATOR);
        if fields.next().map(str::trim) != Some(WRAPPER_TAG) {
            return Err(DocwerkError::InvalidFormat(format!(
                "keywords do not start with {WRAPPER_TAG}"
            )));
        }

        let mut digest = None;
        let mut fragment = Vec::new();
        for field in fields {
            match field.split_once('=') {
                Some(("hash", value)) => digest = Some(PasswordDigest::decode(value)?),
                Some(("data", value)) => {
                    fragment = BASE64.decode(value).map_err(|err| {
                        DocwerkError::InvalidFormat(format!("wrapped fragment is corrupt: {err}"))
                    })?;
                }
                _ => {}
            }
        }
        let digest = digest
            .ok_or_else(|| DocwerkError::InvalidFormat("wrapper carries no password digest".into()))?;
        Ok(Self { digest, fragment })
    }
}

/// Replaces a document with a one-page notice whose keywords hold the
/// password digest and the leading bytes of the original.
pub struct PasswordWrapHandler {
    fragment_len: usize,
    producer: String,
}

impl PasswordWrapHandler {
    pub fn new(fragment_len: usize, producer: String) -> Self {
        Self {
            fragment_len,
            producer,
        }
    }
}

impl OperationHandler for PasswordWrapHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::PasswordWrap
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::PasswordWrap { document, options } = operation else {
            return Err(misrouted(self.kind()));
        };
        if options.password.is_empty() {
            return Err(DocwerkError::ProtectionFailed("password is empty".into()));
        }

        progress.report(10, Some("Reading document"))?;
        let pages = PdfDocument::load(&document)
            .map_err(|err| DocwerkError::ProtectionFailed(format!("cannot load document: {err}")))?
            .page_count();

        progress.report(30, Some("Hashing password"))?;
        let tag = WrapperTag {
            digest: PasswordDigest::create(&options.password)?,
            fragment: document[..document.len().min(self.fragment_len)].to_vec(),
        };

        progress.report(60, Some("Writing wrapper"))?;
        let body = format!(
            "This file was protected with Docwerk. It replaces a document of \
             {pages} pages ({} bytes). Open it with Docwerk and the password to \
             unlock it.",
            document.len()
        );
        let notice = NoticeWriter::new("Protected document").render("Protected document", &body);
        let mut wrapper = PdfDocument::load(&notice).map_err(|err| {
            DocwerkError::ProtectionFailed(format!("cannot build wrapper: {err}"))
        })?;
        wrapper.set_metadata_field(MetadataField::Keywords, Some(&tag.encode()))?;
        wrapper.set_metadata_field(MetadataField::Producer, Some(&self.producer))?;

        let fragment_bytes = tag.fragment.len();
        let result = finish(
            &mut wrapper,
            document.len(),
            OperationDetails::PasswordWrap { fragment_bytes },
        )?;
        info!(
            source = %fingerprint(&document),
            fragment_bytes,
            "Document wrapped"
        );
        progress.report(100, Some("Protection complete"))?;
        Ok(JobOutput::Document(result))
    }
}

/// Checks a password against a wrapper. On success the output is a
/// placeholder notice, not the original document.
pub struct PasswordUnwrapHandler {
    producer: String,
}

impl PasswordUnwrapHandler {
    pub fn new(producer: String) -> Self {
        Self { producer }
    }
}

impl OperationHandler for PasswordUnwrapHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::PasswordUnwrap
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::PasswordUnwrap { document, options } = operation else {
            return Err(misrouted(self.kind()));
        };

        progress.report(10, Some("Reading wrapper"))?;
        let wrapper = PdfDocument::load(&document)
            .map_err(|err| DocwerkError::InvalidFormat(format!("cannot load document: {err}")))?;
        let keywords = wrapper
            .metadata_field(MetadataField::Keywords)
            .ok_or_else(|| DocwerkError::InvalidFormat("document has no keywords".into()))?;
        let tag = WrapperTag::parse(&keywords)?;

        progress.report(40, Some("Checking password"))?;
        if !tag.digest.verify(&options.password) {
            warn!("Password rejected");
            return Err(DocwerkError::InvalidPassword);
        }

        progress.report(70, Some("Writing placeholder"))?;
        let body = format!(
            "The password is correct. The wrapper keeps only the first {} bytes \
             of the original file, so its content cannot be restored here.",
            tag.fragment.len()
        );
        let notice = NoticeWriter::new("Unlocked document").render("Unlocked document", &body);
        let mut placeholder = PdfDocument::load(&notice)?;
        placeholder.set_metadata_field(MetadataField::Producer, Some(&self.producer))?;

        let result = finish(
            &mut placeholder,
            document.len(),
            OperationDetails::PasswordUnwrap { placeholder: true },
        )?;
        progress.report(100, Some("Password accepted"))?;
        Ok(JobOutput::Document(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::numbered_pdf;
    use crate::progress::test_reporter;
    use docwerk_core::{DocumentResult, PasswordUnwrapOptions, PasswordWrapOptions};

    fn wrap(document: Vec<u8>, password: &str, fragment_len: usize) -> Result<DocumentResult> {
        let (mut progress, _rx) = test_reporter();
        PasswordWrapHandler::new(fragment_len, "Docwerk test".into())
            .run(
                Operation::PasswordWrap {
                    document,
                    options: PasswordWrapOptions {
                        password: password.into(),
                    },
                },
                &mut progress,
            )
            .map(|output| output.into_document().expect("document"))
    }

    fn unwrap_with(document: Vec<u8>, password: &str) -> Result<DocumentResult> {
        let (mut progress, _rx) = test_reporter();
        PasswordUnwrapHandler::new("Docwerk test".into())
            .run(
                Operation::PasswordUnwrap {
                    document,
                    options: PasswordUnwrapOptions {
                        password: password.into(),
                    },
                },
                &mut progress,
            )
            .map(|output| output.into_document().expect("document"))
    }

    #[test]
    fn wrapper_is_a_tagged_single_page_notice() {
        let input = numbered_pdf(3);
        let result = wrap(input.clone(), "s3cret", 64).expect("wrap");
        assert_eq!(result.metadata.page_count, 1);
        assert_eq!(
            result.metadata.details,
            OperationDetails::PasswordWrap { fragment_bytes: 64 }
        );

        let doc = PdfDocument::load(&result.bytes).expect("load wrapper");
        let keywords = doc.metadata_field(MetadataField::Keywords).expect("keywords");
        assert!(keywords.starts_with("DOCWERK-PROTECTED;hash="));
        assert!(!keywords.contains("s3cret"));
        let tag = WrapperTag::parse(&keywords).expect("parse tag");
        assert_eq!(tag.fragment, input[..64]);
        assert_eq!(
            doc.metadata_field(MetadataField::Producer).as_deref(),
            Some("Docwerk test")
        );
    }

    #[test]
    fn short_documents_are_kept_whole_in_the_fragment() {
        let input = numbered_pdf(1);
        let result = wrap(input.clone(), "pw", usize::MAX).expect("wrap");
        assert_eq!(
            result.metadata.details,
            OperationDetails::PasswordWrap {
                fragment_bytes: input.len()
            }
        );
    }

    #[test]
    fn correct_password_yields_a_placeholder() {
        let wrapped = wrap(numbered_pdf(2), "open sesame", 1024).expect("wrap");
        let result = unwrap_with(wrapped.bytes, "open sesame").expect("unwrap");
        assert_eq!(
            result.metadata.details,
            OperationDetails::PasswordUnwrap { placeholder: true }
        );
        let doc = PdfDocument::load(&result.bytes).expect("load placeholder");
        assert_eq!(doc.page_count(), 1);
        assert!(
            doc.metadata_field(MetadataField::Keywords)
                .is_none_or(|keywords| !keywords.starts_with(WRAPPER_TAG))
        );
    }

    #[test]
    fn wrong_password_is_rejected() {
        let wrapped = wrap(numbered_pdf(1), "right", 1024).expect("wrap");
        assert!(matches!(
            unwrap_with(wrapped.bytes, "wrong"),
            Err(DocwerkError::InvalidPassword)
        ));
    }

    #[test]
    fn untagged_documents_are_an_invalid_format() {
        assert!(matches!(
            unwrap_with(numbered_pdf(1), "anything"),
            Err(DocwerkError::InvalidFormat(_))
        ));
        assert!(matches!(
            unwrap_with(b"plain text".to_vec(), "anything"),
            Err(DocwerkError::InvalidFormat(_))
        ));
    }

    #[test]
    fn wrap_requires_a_password_and_a_document() {
        assert!(matches!(
            wrap(numbered_pdf(1), "", 1024),
            Err(DocwerkError::ProtectionFailed(_))
        ));
        assert!(matches!(
            wrap(b"junk".to_vec(), "pw", 1024),
            Err(DocwerkError::ProtectionFailed(_))
        ));
    }

    #[test]
    fn tags_without_a_digest_are_rejected() {
        assert!(matches!(
            WrapperTag::parse("DOCWERK-PROTECTED;data=AAAA"),
            Err(DocwerkError::InvalidFormat(_))
        ));
        assert!(matches!(
            WrapperTag::parse("OTHER;hash=00$00"),
            Err(DocwerkError::InvalidFormat(_))
        ));
    }
}
