//! End-to-end benchmark pipeline: catalog, job generation, summary, report

use ganbench::bench::{
    summarize, BenchMode, BenchPlan, ColorMode, FilterOutcome, JobGenerator, MetricMap,
    ModelCatalog, RunOptions, SummaryPalette, SummaryReport, Verdict,
};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

fn write_repo(dir: &Path) -> std::path::PathBuf {
    for config in [
        "configs/dcgan/dcgan_celeba-cropped_64_b128x1_300k.py",
        "configs/singan/singan_fish.py",
        "configs/styleganv2/stylegan2_c2_ffhq_256_b4x8_800k.py",
    ] {
        let path = dir.join(config);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }
    std::fs::write(
        dir.join("configs/metafile.yml"),
        r"
Models:
  - Name: dcgan_celeba
    Config: https://github.com/open-mmlab/mmgeneration/blob/master/configs/dcgan/dcgan_celeba-cropped_64_b128x1_300k.py
    Weights: https://download.openmmlab.com/mmgen/dcgan/dcgan_celeba.pth
    Results:
      - Dataset: CelebA
        Metrics:
          FID: 10.0
          MS-SSIM: 0.25
  - Name: singan_fish
    Config: configs/singan/singan_fish.py
    Results:
      - Metrics:
          SWD: 3.0
  - Name: stylegan2_ffhq
    Config: configs/styleganv2/stylegan2_c2_ffhq_256_b4x8_800k.py
    Weights: https://download.openmmlab.com/mmgen/stylegan2/ffhq.pth
    Results:
      - Metrics:
          FID50k: 2.99
",
    )
    .unwrap();
    let index = dir.join("model-index.yml");
    std::fs::write(&index, "Import:\n  - configs/metafile.yml\n").unwrap();
    index
}

fn write_result(path: &Path, values: &[(&str, f64)]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let map: HashMap<String, f64> = values.iter().map(|(k, v)| ((*k).to_string(), *v)).collect();
    std::fs::write(path, serde_pickle::to_vec(&map, serde_pickle::SerOptions::new()).unwrap())
        .unwrap();
}

#[test]
fn test_train_jobs_infer_gpus_per_config() {
    let repo = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let catalog = ModelCatalog::load(write_repo(repo.path())).unwrap();

    let mut options = RunOptions::new(BenchMode::Train, "mm_lol");
    options.work_dir = work.path().to_path_buf();
    let generator = JobGenerator::new(options).unwrap().with_config_root(repo.path());
    let entries: Vec<_> = catalog.entries().iter().collect();
    let plan = BenchPlan::build(&generator, &entries, 29666).unwrap();
    assert_eq!(plan.scheduled, vec!["dcgan_celeba", "singan_fish", "stylegan2_ffhq"]);

    let gres = |model: &str| {
        let script = std::fs::read_to_string(work.path().join(model).join("job.sh")).unwrap();
        script.lines().find(|l| l.starts_with("#SBATCH --gres")).unwrap().to_string()
    };
    assert_eq!(gres("dcgan_celeba"), "#SBATCH --gres=gpu:1");
    assert_eq!(gres("singan_fish"), "#SBATCH --gres=gpu:1");
    assert_eq!(gres("stylegan2_ffhq"), "#SBATCH --gres=gpu:8");

    let dcgan = std::fs::read_to_string(work.path().join("dcgan_celeba/job.sh")).unwrap();
    assert!(dcgan.contains(" ./configs/dcgan/dcgan_celeba-cropped_64_b128x1_300k.py "));
}

#[test]
fn test_regenerating_jobs_is_byte_identical() {
    let repo = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let catalog = ModelCatalog::load(write_repo(repo.path())).unwrap();
    let mut options = RunOptions::new(BenchMode::Train, "p");
    options.work_dir = work.path().to_path_buf();
    let generator = JobGenerator::new(options).unwrap().with_config_root(repo.path());
    let entries: Vec<_> = catalog.entries().iter().collect();

    let first = BenchPlan::build(&generator, &entries, 100).unwrap();
    let before = std::fs::read(work.path().join("singan_fish/job.sh")).unwrap();
    let second = BenchPlan::build(&generator, &entries, 100).unwrap();
    let after = std::fs::read(work.path().join("singan_fish/job.sh")).unwrap();
    assert_eq!(before, after);
    assert_eq!(first, second);
}

#[test]
fn test_filter_no_match_lists_catalog() {
    let repo = TempDir::new().unwrap();
    let catalog = ModelCatalog::load(write_repo(repo.path())).unwrap();
    match catalog.filter(&["biggan".to_string()]).unwrap() {
        FilterOutcome::NoMatch { available } => {
            assert_eq!(available, vec!["dcgan_celeba", "singan_fish", "stylegan2_ffhq"]);
        }
        FilterOutcome::Selected(_) => panic!("expected no match"),
    }
}

#[test]
fn test_regression_beyond_tolerance_is_unfavorable() {
    let repo = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let catalog = ModelCatalog::load(write_repo(repo.path())).unwrap();
    write_result(
        &work.path().join("dcgan_celeba/result.pkl"),
        &[("FID-Full-50k/fid", 10.5), ("MS-SSIM", 0.3)],
    );

    let FilterOutcome::Selected(entries) = catalog.filter(&["dcgan".to_string()]).unwrap() else {
        panic!("dcgan should match");
    };
    let rows = summarize(&entries, work.path(), &MetricMap::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].metrics["FID"].verdict(), Verdict::Unfavorable);
    // MS-SSIM is larger-is-better: 0.30 vs 0.25 is inside the 0.1 band
    assert_eq!(rows[0].metrics["MS-SSIM"].verdict(), Verdict::Neutral);

    let report = SummaryReport::new(BenchMode::Test, MetricMap::default(), rows);
    let table = report.render_table(&SummaryPalette::new(ColorMode::TrueColor));
    assert!(table.contains("\x1b[38;2;244;67;54m10.50\x1b[0m"));
}

#[test]
fn test_missing_result_renders_pending_row() {
    let repo = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let catalog = ModelCatalog::load(write_repo(repo.path())).unwrap();
    write_result(&work.path().join("singan_fish/result.pkl"), &[("SWD/avg", 2.5)]);

    let entries: Vec<_> = catalog.entries().iter().collect();
    let rows = summarize(&entries, work.path(), &MetricMap::default()).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].is_pending());
    assert_eq!(rows[1].metrics["SWD"].verdict(), Verdict::Favorable);
    assert!(rows[2].is_pending());

    let report = SummaryReport::new(BenchMode::Train, MetricMap::default(), rows);
    let path = report.save(work.path()).unwrap();
    let md = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = md.lines().collect();
    assert_eq!(lines[0], "# Train Benchmark Regression Summary");
    assert!(lines[3].starts_with("| dcgan_celeba |  |  |"));
    assert!(lines[3].ends_with(
        "|  | ./configs/dcgan/dcgan_celeba-cropped_64_b128x1_300k.py |"
    ));
    assert!(lines[4].starts_with("| singan_fish | 3.00 | 2.50 |"));
}

#[test]
fn test_test_mode_skips_missing_checkpoints() {
    let repo = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let ckpts = TempDir::new().unwrap();
    let catalog = ModelCatalog::load(write_repo(repo.path())).unwrap();
    std::fs::create_dir_all(ckpts.path().join("stylegan2")).unwrap();
    std::fs::write(ckpts.path().join("stylegan2/ffhq.pth"), "").unwrap();

    let mut options = RunOptions::new(BenchMode::Test, "p");
    options.work_dir = work.path().to_path_buf();
    options.checkpoint_root = Some(ckpts.path().to_string_lossy().into_owned());
    let generator = JobGenerator::new(options).unwrap().with_config_root(repo.path());
    let entries: Vec<_> = catalog.entries().iter().collect();
    let plan = BenchPlan::build(&generator, &entries, 29666).unwrap();

    assert_eq!(plan.scheduled, vec!["stylegan2_ffhq"]);
    assert_eq!(plan.warnings.len(), 2);
    let script = std::fs::read_to_string(work.path().join("stylegan2_ffhq/job.sh")).unwrap();
    assert!(script.contains("export MASTER_PORT=29668\n"));
    assert!(script.contains("#SBATCH --gres=gpu:8\n#SBATCH --ntasks-per-node=8\n"));
}
