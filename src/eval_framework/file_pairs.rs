use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::eval_framework::evaluation_config::EvaluationConfig;

/// An output file and the gold file it is to be compared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub name: String,
    pub output_path: PathBuf,
    pub gold_path: PathBuf,
}

/// Lists the files of the output directory in sorted name order, each with its gold counterpart.
/// Whether the gold file exists is not checked here.
pub fn discover_file_pairs(config: &EvaluationConfig) -> Result<Vec<FilePair>> {
    let entries = fs::read_dir(&config.out_dir).with_context(|| {
        format!(
            "cannot read output directory `{}`",
            config.out_dir.display()
        )
    })?;

    let mut names = vec![];
    for entry in entries {
        let entry = entry.with_context(|| {
            format!("cannot list output directory `{}`", config.out_dir.display())
        })?;
        //follows symbolic links; a dangling link is kept and fails to open later
        if let Ok(metadata) = fs::metadata(entry.path()) {
            if !metadata.is_file() {
                log::debug!("skipping `{}`: not a file", entry.path().display());
                continue;
            }
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => log::warn!("skipping file with non-UTF-8 name {:?}", name),
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| FilePair {
            output_path: config.out_dir.join(&name),
            gold_path: config.gold_dir.join(config.gold_file_name(&name)),
            name: name,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::eval_framework::{evaluation_config::EvaluationConfig, file_pairs::discover_file_pairs};

    #[test]
    fn sorted_pairs() {
        let gold = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(out.path().join("b.out"), "").unwrap();
        fs::write(out.path().join("a.out"), "").unwrap();
        fs::write(out.path().join("c.txt"), "").unwrap();
        fs::create_dir(out.path().join("sub.out")).unwrap();

        let config = EvaluationConfig::new(gold.path(), out.path());
        let pairs = discover_file_pairs(&config).unwrap();

        let names = pairs.iter().map(|pair| pair.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.out", "b.out", "c.txt"]);
        assert_eq!(pairs[0].gold_path, gold.path().join("a.gold"));
        assert_eq!(pairs[0].output_path, out.path().join("a.out"));
        assert_eq!(pairs[2].gold_path, gold.path().join("c.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_output_file() {
        use crate::techniques::aggregator::{FileOutcome, evaluate_file_pairs};
        use std::os::unix::fs::symlink;

        let gold = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        fs::write(elsewhere.path().join("a.txt"), "T1 [L/M]A FITTING 0.1\n").unwrap();
        fs::write(gold.path().join("a.gold"), "T1 [L/M]A\n").unwrap();
        symlink(elsewhere.path().join("a.txt"), out.path().join("a.out")).unwrap();
        symlink(elsewhere.path().join("missing.txt"), out.path().join("b.out")).unwrap();
        symlink(elsewhere.path(), out.path().join("c.out")).unwrap();

        let config = EvaluationConfig::new(gold.path(), out.path());
        let pairs = discover_file_pairs(&config).unwrap();
        let names = pairs.iter().map(|pair| pair.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.out", "b.out"]);

        let aggregator = evaluate_file_pairs(&pairs, false);
        assert_eq!(aggregator.number_of_evaluated_files(), 1);
        assert_eq!(aggregator.number_of_skipped_files(), 1);
        assert!(matches!(
            aggregator.get_files()[0].outcome,
            FileOutcome::Evaluated(_)
        ));
    }

    #[test]
    fn missing_directory() {
        let config = EvaluationConfig::new("gold", "this/directory/does/not/exist");
        assert!(discover_file_pairs(&config).is_err());
    }
}
