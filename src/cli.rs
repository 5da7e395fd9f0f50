use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// A positional file containing Kaleidoscope code to compile to AArch64 assembly, if not given, starts interpreter instead
    pub file: Option<PathBuf>,

    /// When compiling a file, write the listing here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Leave the section and build version directives out of the listing
    #[arg(long)]
    pub no_preamble: bool,

    /// Prints out the AST of every parsed top-level unit
    #[arg(long)]
    pub inspect_tree: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_arguments() {
        let cli = Cli::try_parse_from(["kaleido-asm"]).unwrap();
        assert!(cli.file.is_none());
        assert!(!cli.no_preamble && !cli.inspect_tree);

        let cli = Cli::try_parse_from([
            "kaleido-asm",
            "prog.kal",
            "-o",
            "prog.s",
            "--no-preamble",
            "--inspect-tree",
        ])
        .unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("prog.kal")));
        assert_eq!(cli.output, Some(PathBuf::from("prog.s")));
        assert!(cli.no_preamble && cli.inspect_tree);
    }
}
