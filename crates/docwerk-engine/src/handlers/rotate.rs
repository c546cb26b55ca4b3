// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rotate: set an absolute rotation on selected pages.

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::{
    JobOutput, Operation, OperationDetails, OperationKind, Orientation, OrientationChange,
};
use docwerk_document::PdfDocument;
use tracing::{debug, instrument};

use super::{finish, misrouted};
use crate::progress::ProgressReporter;
use crate::registry::OperationHandler;

/// Sets `/Rotate` to the requested angle. The angle replaces the page's
/// existing rotation rather than adding to it; callers wanting a cumulative
/// rotation pass the summed angle, which is normalised into `0..360`
/// (so 270 + 90 lands on 0).
pub struct RotateHandler;

impl OperationHandler for RotateHandler {
    fn kind(&self) -> OperationKind {
        OperationKind::Rotate
    }

    #[instrument(skip_all, fields(job_id = %progress.job_id()))]
    fn run(&self, operation: Operation, progress: &mut ProgressReporter) -> Result<JobOutput> {
        let Operation::Rotate { document, options } = operation else {
            return Err(misrouted(self.kind()));
        };
        if options.angle % 90 != 0 {
            return Err(DocwerkError::RotationFailed(format!(
                "angle must be a multiple of 90, got {}",
                options.angle
            )));
        }
        let angle = options.angle.rem_euclid(360);

        progress.report(10, Some("Loading document"))?;
        let mut doc = PdfDocument::load(&document)
            .map_err(|err| DocwerkError::RotationFailed(format!("cannot load document: {err}")))?;
        let total = doc.page_count();

        let selected: Vec<u32> = match options.pages {
            Some(pages) => pages,
            None => (0..total as u32).collect(),
        };
        let invalid: Vec<u32> = selected
            .iter()
            .filter(|&&page| page as usize >= total)
            .map(|page| page + 1)
            .collect();
        if !invalid.is_empty() {
            return Err(DocwerkError::InvalidPages {
                pages: invalid,
                total,
            });
        }

        let mut orientations = Vec::with_capacity(selected.len());
        for (done, &page) in selected.iter().enumerate() {
            let index = page as usize;
            let (width, height) = doc.page_size(index)?;
            let before = Orientation::classify(width, height, doc.rotation(index)?);
            doc.set_rotation(index, angle)?;
            let after = Orientation::classify(width, height, angle);
            debug!(page, ?before, ?after, "Page rotated");
            orientations.push(OrientationChange {
                page,
                before,
                after,
            });
            progress.report_step(10, 90, done + 1, selected.len())?;
        }

        let result = finish(
            &mut doc,
            document.len(),
            OperationDetails::Rotate {
                angle,
                rotated_pages: selected,
                orientations,
            },
        )?;
        progress.report(100, Some("Rotation complete"))?;
        Ok(JobOutput::Document(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::sized_pdf;
    use crate::progress::test_reporter;
    use docwerk_core::RotateOptions;

    fn rotate(document: Vec<u8>, angle: i64, pages: Option<Vec<u32>>) -> Result<JobOutput> {
        let (mut progress, _rx) = test_reporter();
        RotateHandler.run(
            Operation::Rotate {
                document,
                options: RotateOptions { angle, pages },
            },
            &mut progress,
        )
    }

    fn rotations(bytes: &[u8]) -> Vec<i64> {
        let doc = PdfDocument::load(bytes).expect("load");
        (0..doc.page_count())
            .map(|i| doc.rotation(i).expect("rotation"))
            .collect()
    }

    #[test]
    fn rotation_is_absolute() {
        let input = sized_pdf(&[(100.0, 200.0), (100.0, 200.0)]);
        let once = rotate(input, 90, None)
            .expect("rotate")
            .into_document()
            .expect("document");
        let twice = rotate(once.bytes, 90, None)
            .expect("rotate")
            .into_document()
            .expect("document");
        assert_eq!(rotations(&twice.bytes), vec![90, 90]);
    }

    #[test]
    fn only_selected_pages_rotate() {
        let input = sized_pdf(&[(100.0, 200.0), (100.0, 200.0), (100.0, 200.0)]);
        let result = rotate(input, 180, Some(vec![1]))
            .expect("rotate")
            .into_document()
            .expect("document");
        assert_eq!(rotations(&result.bytes), vec![0, 180, 0]);
    }

    #[test]
    fn out_of_range_pages_are_reported_one_based() {
        let input = sized_pdf(&[(100.0, 200.0), (100.0, 200.0)]);
        let err = rotate(input, 90, Some(vec![0, 2, 7])).err().expect("fails");
        match err {
            DocwerkError::InvalidPages { pages, total } => {
                assert_eq!(pages, vec![3, 8]);
                assert_eq!(total, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cumulative_angles_wrap_to_a_full_turn() {
        let input = sized_pdf(&[(100.0, 200.0)]);
        let untouched = Orientation::classify(100.0, 200.0, 0);
        let turned = rotate(input, 270, None)
            .expect("rotate")
            .into_document()
            .expect("document");
        assert_eq!(rotations(&turned.bytes), vec![270]);

        let current = rotations(&turned.bytes)[0];
        let result = rotate(turned.bytes, current + 90, None)
            .expect("rotate")
            .into_document()
            .expect("document");
        assert_eq!(rotations(&result.bytes), vec![0]);
        let OperationDetails::Rotate {
            angle,
            orientations,
            ..
        } = result.metadata.details
        else {
            panic!("expected rotate details");
        };
        assert_eq!(angle, 0);
        assert_eq!(orientations[0].before, Orientation::Landscape);
        assert_eq!(orientations[0].after, untouched);
    }

    #[test]
    fn negative_quarter_turns_are_normalised() {
        let input = sized_pdf(&[(100.0, 200.0)]);
        let result = rotate(input, -90, None)
            .expect("rotate")
            .into_document()
            .expect("document");
        assert_eq!(rotations(&result.bytes), vec![270]);
    }

    #[test]
    fn non_quarter_angles_are_rejected() {
        let input = sized_pdf(&[(100.0, 200.0)]);
        for angle in [1, 45, 100, -30] {
            assert!(matches!(
                rotate(input.clone(), angle, None),
                Err(DocwerkError::RotationFailed(_))
            ));
        }
    }

    #[test]
    fn orientation_changes_are_recorded() {
        let input = sized_pdf(&[(100.0, 200.0)]);
        let result = rotate(input, 270, None)
            .expect("rotate")
            .into_document()
            .expect("document");
        let OperationDetails::Rotate { orientations, .. } = result.metadata.details else {
            panic!("expected rotate details");
        };
        assert_eq!(
            orientations,
            vec![OrientationChange {
                page: 0,
                before: Orientation::Portrait,
                after: Orientation::Landscape,
            }]
        );
    }
}
