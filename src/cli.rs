use std::path::PathBuf;

use clap::Parser;

/// Curate an image dataset: crop, split, pad and caption images in place.
#[derive(Parser, Debug)]
#[command(
    name = "image_toolkit",
    about = "Image dataset curator",
    long_about = "Open a dataset folder, or a loose list of images, in the curator.\n\n\
                  Example:\n  \
                  image_toolkit ~/datasets/portraits\n  \
                  image_toolkit a.png b.jpg"
)]
pub struct Cli {
    /// A dataset folder, or one or more image files.
    #[arg(value_name = "FOLDER | IMAGE")]
    pub paths: Vec<PathBuf>,
}

/// What the app starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Startup {
    Folder(PathBuf),
    Images(Vec<PathBuf>),
}

impl Cli {
    pub fn startup(self) -> Startup {
        match self.paths.as_slice() {
            [folder] if folder.is_dir() => Startup::Folder(folder.clone()),
            _ => Startup::Images(self.paths),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_single_directory_opens_as_a_folder() {
        let dir = std::env::temp_dir();
        let cli = Cli::try_parse_from([PathBuf::from("image_toolkit"), dir.clone()]).unwrap();
        assert_eq!(cli.startup(), Startup::Folder(dir));
    }

    #[test]
    fn files_open_as_loose_images() {
        let cli = Cli::try_parse_from(["image_toolkit", "a.png", "b.jpg"]).unwrap();
        assert_eq!(
            cli.startup(),
            Startup::Images(vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")])
        );

        let empty = Cli::try_parse_from(["image_toolkit"]).unwrap();
        assert_eq!(empty.startup(), Startup::Images(Vec::new()));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["image_toolkit", "--bogus"]).is_err());
    }
}
