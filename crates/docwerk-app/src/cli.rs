// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use docwerk_core::{
    CompressionQuality, ImageLayout, PageOrientation, PageSize, WatermarkPosition,
};

/// Merge, split, rotate, watermark and convert documents locally.
#[derive(Debug, Parser)]
#[command(name = "docwerk", about, version)]
pub struct Cli {
    /// Engine configuration file (JSON). Default:
    /// $XDG_CONFIG_HOME/docwerk/config.json when present
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Concatenate documents in the order given
    Merge {
        #[arg(value_name = "FILE", required = true, num_args = 2..)]
        files: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split a document into several
    Split {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = SplitModeArg::All)]
        mode: SplitModeArg,

        /// Inclusive range for `--mode range` (e.g. '2-7')
        #[arg(long)]
        range: Option<String>,

        /// Pages for `--mode pages` (e.g. '1,3-5')
        #[arg(long)]
        pages: Option<String>,

        /// Directory for the numbered output files
        #[arg(short, long, value_name = "DIR")]
        output_dir: PathBuf,
    },

    /// Set the rotation of pages
    Rotate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Multiple of 90; a summed cumulative angle such as 360 is accepted
        #[arg(long, allow_negative_numbers = true)]
        angle: i64,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Stamp a line of text on every page
    Watermark {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, default_value = "CONFIDENTIAL")]
        text: String,

        #[arg(long, default_value_t = 48.0)]
        font_size: f32,

        /// Opacity in percent
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(0..=100))]
        opacity: u8,

        /// Counter-clockwise rotation in degrees
        #[arg(long, default_value_t = 45.0, allow_negative_numbers = true)]
        rotation: f32,

        #[arg(long, value_enum, default_value_t = PositionArg::Center)]
        position: PositionArg,

        /// Text colour as hex (e.g. 'ff0000'). Default: gray
        #[arg(long)]
        color: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Build a document with one page per image
    Images {
        #[arg(value_name = "IMAGE", required = true)]
        files: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = PageSizeArg::A4)]
        page_size: PageSizeArg,

        #[arg(long)]
        landscape: bool,

        #[arg(long, value_enum, default_value_t = LayoutArg::Fit)]
        layout: LayoutArg,

        /// Margin in points
        #[arg(long, default_value_t = 36.0)]
        margin: f32,

        /// JPEG quality for images that must be re-encoded
        #[arg(long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,

        /// Page background as hex (e.g. 'ffffff')
        #[arg(long)]
        background: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Shrink a document by restructuring it
    Compress {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = QualityArg::Medium)]
        quality: QualityArg,

        /// Keep title, author and the other information fields
        #[arg(long)]
        keep_metadata: bool,

        /// Recorded in the result; images are not re-encoded
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        image_quality: Option<u8>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace a document with a password-tagged wrapper
    Protect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        password: String,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check a wrapper's password
    Unprotect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        password: String,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitModeArg {
    /// One document per page
    All,
    /// One document holding `--range`
    Range,
    /// One document per page listed in `--pages`
    Pages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PositionArg {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<PositionArg> for WatermarkPosition {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Center => Self::Center,
            PositionArg::TopLeft => Self::TopLeft,
            PositionArg::TopRight => Self::TopRight,
            PositionArg::BottomLeft => Self::BottomLeft,
            PositionArg::BottomRight => Self::BottomRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageSizeArg {
    A4,
    Letter,
    /// Sized from the largest image
    Auto,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A4 => Self::A4,
            PageSizeArg::Letter => Self::Letter,
            PageSizeArg::Auto => Self::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Scale to fit inside the margins
    Fit,
    /// One pixel per point
    Actual,
    FitWidth,
    FitHeight,
}

impl From<LayoutArg> for ImageLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Fit => Self::FitToPage,
            LayoutArg::Actual => Self::ActualSize,
            LayoutArg::FitWidth => Self::FitWidth,
            LayoutArg::FitHeight => Self::FitHeight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    Low,
    Medium,
    High,
}

impl From<QualityArg> for CompressionQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Low => Self::Low,
            QualityArg::Medium => Self::Medium,
            QualityArg::High => Self::High,
        }
    }
}

pub fn orientation(landscape: bool) -> PageOrientation {
    if landscape {
        PageOrientation::Landscape
    } else {
        PageOrientation::Portrait
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn merge_needs_two_files() {
        assert!(Cli::try_parse_from(["docwerk", "merge", "a.pdf", "-o", "out.pdf"]).is_err());
        let cli = Cli::try_parse_from(["docwerk", "merge", "a.pdf", "b.pdf", "-o", "out.pdf"])
            .expect("parse");
        let Commands::Merge { files, output } = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(files.len(), 2);
        assert_eq!(output, PathBuf::from("out.pdf"));
    }

    #[test]
    fn watermark_defaults_match_the_engine() {
        let cli = Cli::try_parse_from(["docwerk", "watermark", "in.pdf", "-o", "out.pdf"])
            .expect("parse");
        let Commands::Watermark {
            text,
            font_size,
            opacity,
            rotation,
            position,
            ..
        } = cli.command
        else {
            panic!("expected watermark");
        };
        let defaults = docwerk_core::WatermarkOptions::default();
        assert_eq!(text, defaults.text);
        assert_eq!(font_size, defaults.font_size);
        assert_eq!(opacity, defaults.opacity_percent);
        assert_eq!(rotation, defaults.rotation_degrees);
        assert_eq!(WatermarkPosition::from(position), defaults.position);
    }

    #[test]
    fn opacity_is_bounded() {
        assert!(
            Cli::try_parse_from([
                "docwerk", "watermark", "in.pdf", "--opacity", "150", "-o", "out.pdf"
            ])
            .is_err()
        );
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "docwerk", "compress", "in.pdf", "-o", "out.pdf", "--config", "c.json",
        ])
        .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
    }
}
