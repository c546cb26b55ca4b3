// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Turn a parsed command into an engine operation plus where its output goes.

use std::path::{Path, PathBuf};

use docwerk_core::{
    CompressOptions, ImageToDocumentOptions, MergeOptions, Operation, PasswordUnwrapOptions,
    PasswordWrapOptions, Rgb, RotateOptions, SplitOptions, WatermarkOptions,
};
use tracing::debug;

use crate::cli::{self, Commands, SplitModeArg};
use crate::error::CliError;
use crate::page_list::{parse_page_list, parse_page_span};

/// Where results are written.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    File(PathBuf),
    /// Numbered files `<stem>-<n>.pdf` inside `dir`.
    Directory { dir: PathBuf, stem: String },
}

impl Destination {
    /// Path for the output document, or for batch item `index`.
    pub fn path_for(&self, index: Option<usize>) -> PathBuf {
        match (self, index) {
            (Self::File(path), None) => path.clone(),
            (Self::File(path), Some(index)) => {
                let stem = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".into());
                path.with_file_name(format!("{stem}-{}.pdf", index + 1))
            }
            (Self::Directory { dir, stem }, None) => dir.join(format!("{stem}.pdf")),
            (Self::Directory { dir, stem }, Some(index)) => {
                dir.join(format!("{stem}-{}.pdf", index + 1))
            }
        }
    }
}

/// A ready-to-submit job.
#[derive(Debug)]
pub struct Plan {
    pub operation: Operation,
    pub destination: Destination,
}

pub fn plan(command: Commands) -> Result<Plan, CliError> {
    let planned = match command {
        Commands::Merge { files, output } => Plan {
            operation: Operation::Merge {
                documents: files.iter().map(|path| read(path)).collect::<Result<_, _>>()?,
                options: MergeOptions::default(),
            },
            destination: Destination::File(output),
        },

        Commands::Split {
            file,
            mode,
            range,
            pages,
            output_dir,
        } => {
            let options = match mode {
                SplitModeArg::All => SplitOptions::all_pages(),
                SplitModeArg::Range => {
                    let range = range
                        .ok_or_else(|| CliError::Usage("--mode range needs --range".into()))?;
                    let (start, end) = parse_page_span(&range).map_err(CliError::Usage)?;
                    SplitOptions::range(start, end)
                }
                SplitModeArg::Pages => {
                    let pages = pages
                        .ok_or_else(|| CliError::Usage("--mode pages needs --pages".into()))?;
                    SplitOptions::specific(parse_page_list(&pages).map_err(CliError::Usage)?)
                }
            };
            let stem = file_stem(&file);
            Plan {
                operation: Operation::Split {
                    document: read(&file)?,
                    options,
                },
                destination: Destination::Directory {
                    dir: output_dir,
                    stem,
                },
            }
        }

        Commands::Rotate {
            file,
            angle,
            pages,
            output,
        } => {
            let pages = pages
                .as_deref()
                .map(parse_page_list)
                .transpose()
                .map_err(CliError::Usage)?;
            Plan {
                operation: Operation::Rotate {
                    document: read(&file)?,
                    options: RotateOptions { angle, pages },
                },
                destination: Destination::File(output),
            }
        }

        Commands::Watermark {
            file,
            text,
            font_size,
            opacity,
            rotation,
            position,
            color,
            output,
        } => {
            let defaults = WatermarkOptions::default();
            Plan {
                operation: Operation::Watermark {
                    document: read(&file)?,
                    options: WatermarkOptions {
                        text,
                        font_size,
                        opacity_percent: opacity,
                        rotation_degrees: rotation,
                        position: position.into(),
                        color: color
                            .as_deref()
                            .map(parse_color)
                            .transpose()?
                            .unwrap_or(defaults.color),
                    },
                },
                destination: Destination::File(output),
            }
        }

        Commands::Images {
            files,
            page_size,
            landscape,
            layout,
            margin,
            quality,
            background,
            output,
        } => Plan {
            operation: Operation::ImageToDocument {
                images: files.iter().map(|path| read(path)).collect::<Result<_, _>>()?,
                options: ImageToDocumentOptions {
                    page_size: page_size.into(),
                    orientation: cli::orientation(landscape),
                    layout: layout.into(),
                    margin_points: margin,
                    quality,
                    background_color: background.as_deref().map(parse_color).transpose()?,
                },
            },
            destination: Destination::File(output),
        },

        Commands::Compress {
            file,
            quality,
            keep_metadata,
            image_quality,
            output,
        } => Plan {
            operation: Operation::Compress {
                document: read(&file)?,
                options: CompressOptions {
                    quality: quality.into(),
                    remove_metadata: !keep_metadata,
                    image_compression_hint: image_quality,
                },
            },
            destination: Destination::File(output),
        },

        Commands::Protect {
            file,
            password,
            output,
        } => Plan {
            operation: Operation::PasswordWrap {
                document: read(&file)?,
                options: PasswordWrapOptions { password },
            },
            destination: Destination::File(output),
        },

        Commands::Unprotect {
            file,
            password,
            output,
        } => Plan {
            operation: Operation::PasswordUnwrap {
                document: read(&file)?,
                options: PasswordUnwrapOptions { password },
            },
            destination: Destination::File(output),
        },
    };
    debug!(
        kind = %planned.operation.kind(),
        input_bytes = planned.operation.input_size(),
        "Job planned"
    );
    Ok(planned)
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "part".into())
}

fn parse_color(hex: &str) -> Result<Rgb, CliError> {
    Rgb::from_hex(hex).ok_or_else(|| CliError::Usage(format!("'{hex}' is not a hex colour")))
}
