//! Cluster job script generation
//!
//! One [`JobDescriptor`] per benchmarked model. Rendering is a pure function
//! of the descriptor, so regenerating a job for the same inputs rewrites
//! byte-identical scripts.

use super::catalog::ModelCatalogEntry;
use super::storage::{storage_for_root, CheckpointStorage};
use crate::config::{MailType, QuotaType};
use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const CONFIG_PREFIX_BLOB: &str = "https://github.com/open-mmlab/mmgeneration/blob/master/";
const CONFIG_PREFIX_TREE: &str = "https://github.com/open-mmlab/mmgeneration/tree/master/";

/// Prefix of published checkpoint URLs, stripped to get the storage key
pub const DOWNLOAD_PREFIX: &str = "https://download.openmmlab.com/mmgen/";

const DEFAULT_GPUS: u32 = 8;
const MAX_TASKS_PER_NODE: u32 = 8;
const CPUS_PER_TASK: u32 = 5;

/// Which benchmark pipeline a job belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BenchMode {
    Train,
    Test,
}

impl BenchMode {
    /// Runner entry point invoked by the job script
    pub fn entry_point(self) -> &'static str {
        match self {
            BenchMode::Train => "tools/train.py",
            BenchMode::Test => "tools/test.py",
        }
    }

    pub fn default_job_name(self) -> &'static str {
        match self {
            BenchMode::Train => "gen-train-benchmark",
            BenchMode::Test => "gen-test-benchmark",
        }
    }

    pub fn default_work_dir(self) -> PathBuf {
        match self {
            BenchMode::Train => PathBuf::from("work_dirs/benchmark_train"),
            BenchMode::Test => PathBuf::from("work_dirs/benchmark_test"),
        }
    }

    /// File name of the saved Markdown summary
    pub fn report_file_name(self) -> &'static str {
        match self {
            BenchMode::Train => "train_benchmark_summary.md",
            BenchMode::Test => "test_benchmark_summary.md",
        }
    }

    /// Capitalized name used in report titles
    pub fn title(self) -> &'static str {
        match self {
            BenchMode::Train => "Train",
            BenchMode::Test => "Test",
        }
    }
}

impl fmt::Display for BenchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchMode::Train => write!(f, "train"),
            BenchMode::Test => write!(f, "test"),
        }
    }
}

/// Settings shared by every job of one benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub mode: BenchMode,
    pub partition: String,
    /// Job name prefix; each job is named `<prefix>_<model>`
    pub job_name: String,
    pub work_dir: PathBuf,
    /// Read configs from `configs_ceph` instead of `configs`
    pub use_alternate_config: bool,
    pub local: bool,
    pub mail: Option<String>,
    pub mail_types: Vec<MailType>,
    pub quota_type: Option<QuotaType>,
    /// Test mode only: where trained checkpoints live
    pub checkpoint_root: Option<String>,
}

impl RunOptions {
    pub fn new(mode: BenchMode, partition: impl Into<String>) -> Self {
        Self {
            mode,
            partition: partition.into(),
            job_name: mode.default_job_name().to_string(),
            work_dir: mode.default_work_dir(),
            use_alternate_config: false,
            local: false,
            mail: None,
            mail_types: vec![MailType::Begin],
            quota_type: None,
            checkpoint_root: None,
        }
    }

    /// Mail lines are emitted only with an address and without `NONE`
    fn mail_directive(&self) -> Option<(String, String)> {
        let mail = self.mail.as_ref()?;
        if self.mail_types.contains(&MailType::None) {
            return None;
        }
        let types: Vec<String> = self.mail_types.iter().map(ToString::to_string).collect();
        Some((mail.clone(), types.join(",")))
    }
}

/// Resolve a catalog config reference to a repository-relative path
///
/// Upstream GitHub URLs become `./<path>`; with `use_alternate` every
/// `configs` segment is redirected to `configs_ceph`.
pub fn normalize_config_path(raw: &str, use_alternate: bool) -> String {
    let mut config = raw.to_string();
    if config.starts_with("http") {
        config = config.replace(CONFIG_PREFIX_BLOB, "./").replace(CONFIG_PREFIX_TREE, "./");
    }
    if use_alternate {
        config = config.replace("configs", "configs_ceph");
    }
    config
}

static BATCH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"b\d+x(\d+)").expect("Invalid batch regex"));

/// GPUs requested by a training job, read from the config file name
///
/// The SinGAN family trains on one GPU. Otherwise a `b<batch>x<ngpu>` token
/// gives the count, defaulting to eight.
pub fn infer_gpu_count(config_file_name: &str) -> u32 {
    if config_file_name.contains("singan") {
        return 1;
    }
    BATCH_REGEX
        .captures(config_file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_GPUS)
}

/// Everything needed to render and launch one model's job
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptor {
    pub mode: BenchMode,
    pub model_name: String,
    pub job_name: String,
    pub partition: String,
    pub gpus: u32,
    pub port: u16,
    /// Per-model directory holding the script, logs and results
    pub work_dir: PathBuf,
    pub script_path: PathBuf,
    pub config: String,
    pub checkpoint: Option<String>,
    pub local: bool,
    mail: Option<(String, String)>,
    quota_type: Option<QuotaType>,
}

impl JobDescriptor {
    pub fn tasks_per_node(&self) -> u32 {
        self.gpus.min(MAX_TASKS_PER_NODE)
    }

    pub fn tasks(&self) -> u32 {
        self.gpus
    }

    pub fn cpus_per_task(&self) -> u32 {
        CPUS_PER_TASK
    }

    /// Test mode only
    pub fn result_file(&self) -> Option<PathBuf> {
        match self.mode {
            BenchMode::Test => Some(self.work_dir.join("result.pkl")),
            BenchMode::Train => None,
        }
    }

    fn launcher(&self) -> &'static str {
        if self.local {
            "none"
        } else {
            "slurm"
        }
    }

    fn runner(&self) -> &'static str {
        if self.local {
            "python"
        } else {
            "srun python"
        }
    }

    /// The runner invocation on the last line of the script
    pub fn direct_command(&self) -> String {
        let mut cmd = format!("{} -u {} {}", self.runner(), self.mode.entry_point(), self.config);
        if let Some(checkpoint) = &self.checkpoint {
            cmd.push(' ');
            cmd.push_str(checkpoint);
        }
        cmd.push_str(&format!(" --work-dir={}", self.work_dir.display()));
        if let Some(result_file) = self.result_file() {
            cmd.push_str(&format!(" --out={}", result_file.display()));
        }
        cmd.push_str(&format!(" --launcher={}", self.launcher()));
        cmd
    }

    pub fn render_script(&self) -> String {
        let mut script = String::from("#!/bin/bash\n");
        script.push_str(&format!("#SBATCH --output {}/job.%j.out\n", self.work_dir.display()));
        script.push_str(&format!("#SBATCH --partition={}\n", self.partition));
        script.push_str(&format!("#SBATCH --job-name {}\n", self.job_name));
        script.push_str(&format!("#SBATCH --gres=gpu:{}\n", self.gpus));
        if let Some((mail, types)) = &self.mail {
            script.push_str(&format!("#SBATCH --mail {mail}\n"));
            script.push_str(&format!("#SBATCH --mail-type {types}\n"));
        }
        if let Some(quota) = self.quota_type {
            script.push_str(&format!("#SBATCH --quotatype {quota}\n"));
        }
        script.push_str(&format!("#SBATCH --ntasks-per-node={}\n", self.tasks_per_node()));
        script.push_str(&format!("#SBATCH --ntasks={}\n", self.tasks()));
        script.push_str(&format!("#SBATCH --cpus-per-task={}\n", self.cpus_per_task()));
        script.push('\n');
        script.push_str(&format!("export MASTER_PORT={}\n", self.port));
        script.push_str(&self.direct_command());
        script.push('\n');
        script
    }

    /// Create the work dir and (re)write `job.sh`
    pub fn write_script(&self) -> Result<()> {
        std::fs::create_dir_all(&self.work_dir).map_err(|e| {
            Error::io(format!("Failed to create work dir {}", self.work_dir.display()), e)
        })?;
        std::fs::write(&self.script_path, self.render_script()).map_err(|e| {
            Error::io(format!("Failed to write job script {}", self.script_path.display()), e)
        })
    }

    pub fn preview_command(&self) -> String {
        format!("echo \"{}\"", self.config)
    }

    /// `bash <script>` locally, `sbatch <script>` on the cluster
    pub fn launch_command(&self) -> String {
        let launcher = if self.local { "bash" } else { "sbatch" };
        format!("{launcher} {}", self.script_path.display())
    }
}

/// Result of preparing one model
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    Job(Box<JobDescriptor>),
    /// Skipped with a warning message
    Skipped(String),
}

impl Generated {
    pub fn into_job(self) -> Option<JobDescriptor> {
        match self {
            Generated::Job(job) => Some(*job),
            Generated::Skipped(_) => None,
        }
    }
}

/// Builds job descriptors and scripts for catalog entries
pub struct JobGenerator {
    options: RunOptions,
    config_root: PathBuf,
    storage: Option<Box<dyn CheckpointStorage>>,
}

impl JobGenerator {
    /// Set up a generator; test mode picks the checkpoint backend from the root
    pub fn new(options: RunOptions) -> Result<Self> {
        let storage = match (&options.mode, &options.checkpoint_root) {
            (BenchMode::Test, Some(root)) => Some(storage_for_root(root)?),
            (BenchMode::Test, None) => {
                return Err(Error::ConfigError(
                    "test benchmark requires a checkpoint root".to_string(),
                ))
            }
            (BenchMode::Train, _) => None,
        };
        Ok(Self { options, config_root: PathBuf::from("."), storage })
    }

    /// Replace the checkpoint backend
    pub fn with_storage(mut self, storage: Box<dyn CheckpointStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Directory that relative config paths are checked against
    pub fn with_config_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config_root = root.into();
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Prepare one model's job and write its script
    ///
    /// A missing config is fatal. In test mode a missing checkpoint yields
    /// `Ok(None)`.
    pub fn generate(&self, entry: &ModelCatalogEntry, port: u16) -> Result<Option<JobDescriptor>> {
        self.prepare(entry, port).map(Generated::into_job)
    }

    /// Like [`generate`](Self::generate), keeping the skip reason
    pub fn prepare(&self, entry: &ModelCatalogEntry, port: u16) -> Result<Generated> {
        let config = normalize_config_path(&entry.config, self.options.use_alternate_config);
        let config_path = self.config_root.join(&config);
        if !config_path.exists() {
            return Err(Error::ConfigNotFound { model: entry.name.clone(), path: config_path });
        }

        let checkpoint = match self.options.mode {
            BenchMode::Train => None,
            BenchMode::Test => match self.resolve_checkpoint(entry) {
                Ok(checkpoint) => Some(checkpoint),
                Err(reason) => return Ok(Generated::Skipped(reason)),
            },
        };

        let gpus = match self.options.mode {
            BenchMode::Train => infer_gpu_count(&config_file_name(&config)),
            BenchMode::Test => DEFAULT_GPUS,
        };

        let work_dir = self.options.work_dir.join(&entry.name);
        let job = JobDescriptor {
            mode: self.options.mode,
            model_name: entry.name.clone(),
            job_name: format!("{}_{}", self.options.job_name, entry.name),
            partition: self.options.partition.clone(),
            gpus,
            port,
            script_path: work_dir.join("job.sh"),
            work_dir,
            config,
            checkpoint,
            local: self.options.local,
            mail: self.options.mail_directive(),
            quota_type: self.options.quota_type,
        };
        job.write_script()?;
        Ok(Generated::Job(Box::new(job)))
    }

    fn resolve_checkpoint(&self, entry: &ModelCatalogEntry) -> std::result::Result<String, String> {
        let (Some(storage), Some(root)) = (&self.storage, &self.options.checkpoint_root) else {
            return Err(format!("{}: no checkpoint storage configured", entry.name));
        };
        let Some(weights) = &entry.weights else {
            return Err(format!("{}: no weights listed in the model index", entry.name));
        };
        let checkpoint = storage.join_path(root, &weights.replace(DOWNLOAD_PREFIX, ""));
        if storage.exists(&checkpoint).exists() {
            Ok(checkpoint)
        } else {
            Err(format!("{}: {checkpoint} not found.", entry.name))
        }
    }
}

fn config_file_name(config: &str) -> String {
    Path::new(config)
        .file_name()
        .map_or_else(|| config.to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::storage::Presence;
    use std::collections::HashSet;
    use tempfile::TempDir;

    struct FakeStorage {
        present: HashSet<String>,
    }

    impl CheckpointStorage for FakeStorage {
        fn exists(&self, path: &str) -> Presence {
            self.present.contains(path).into()
        }

        fn join_path(&self, root: &str, relative: &str) -> String {
            format!("{root}/{relative}")
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn repo_with_config(config: &str) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "model = dict()\n").unwrap();
        dir
    }

    fn train_options(work_dir: &Path) -> RunOptions {
        let mut options = RunOptions::new(BenchMode::Train, "mm_lol");
        options.work_dir = work_dir.to_path_buf();
        options
    }

    #[test]
    fn test_normalize_config_path() {
        assert_eq!(
            normalize_config_path(
                "https://github.com/open-mmlab/mmgeneration/blob/master/configs/dcgan/a.py",
                false
            ),
            "./configs/dcgan/a.py"
        );
        assert_eq!(
            normalize_config_path(
                "https://github.com/open-mmlab/mmgeneration/tree/master/configs/dcgan",
                false
            ),
            "./configs/dcgan"
        );
        assert_eq!(normalize_config_path("configs/dcgan/a.py", true), "configs_ceph/dcgan/a.py");
        assert_eq!(normalize_config_path("configs/dcgan/a.py", false), "configs/dcgan/a.py");
    }

    #[test]
    fn test_infer_gpu_count() {
        assert_eq!(infer_gpu_count("singan_fish.py"), 1);
        assert_eq!(infer_gpu_count("singan_b1x4_fish.py"), 1);
        assert_eq!(infer_gpu_count("stylegan2_c2_ffhq_256_b4x8_800k.py"), 8);
        assert_eq!(infer_gpu_count("wgangp_GN_lsun-bedroom_128_b64x1_160kiter.py"), 1);
        assert_eq!(infer_gpu_count("dcgan_celeba-cropped_64_b128x1_300k.py"), 1);
        assert_eq!(infer_gpu_count("pggan_celeba-hq_1024_g8_12Mimg.py"), 8);
        assert_eq!(infer_gpu_count("biggan_b32x16_500k.py"), 16);
    }

    #[test]
    fn test_mode_defaults() {
        assert_eq!(BenchMode::Train.default_job_name(), "gen-train-benchmark");
        assert_eq!(BenchMode::Test.default_job_name(), "gen-test-benchmark");
        assert_eq!(BenchMode::Train.default_work_dir(), PathBuf::from("work_dirs/benchmark_train"));
        assert_eq!(BenchMode::Test.report_file_name(), "test_benchmark_summary.md");
        assert_eq!(BenchMode::Test.entry_point(), "tools/test.py");
    }

    #[test]
    fn test_train_script_contents() {
        let repo = repo_with_config("configs/wgan-gp/wgangp_b64x2_160kiter.py");
        let work = tempfile::tempdir().unwrap();
        let generator = JobGenerator::new(train_options(work.path()))
            .unwrap()
            .with_config_root(repo.path());
        let entry =
            ModelCatalogEntry::new("wgangp_b64x2", "configs/wgan-gp/wgangp_b64x2_160kiter.py");

        let job = generator.generate(&entry, 29666).unwrap().unwrap();
        let model_dir = work.path().join("wgangp_b64x2");
        let expected = format!(
            "#!/bin/bash\n\
             #SBATCH --output {dir}/job.%j.out\n\
             #SBATCH --partition=mm_lol\n\
             #SBATCH --job-name gen-train-benchmark_wgangp_b64x2\n\
             #SBATCH --gres=gpu:2\n\
             #SBATCH --ntasks-per-node=2\n\
             #SBATCH --ntasks=2\n\
             #SBATCH --cpus-per-task=5\n\
             \n\
             export MASTER_PORT=29666\n\
             srun python -u tools/train.py configs/wgan-gp/wgangp_b64x2_160kiter.py \
             --work-dir={dir} --launcher=slurm\n",
            dir = model_dir.display()
        );
        assert_eq!(job.render_script(), expected);
        assert_eq!(std::fs::read_to_string(model_dir.join("job.sh")).unwrap(), expected);
        assert_eq!(job.preview_command(), "echo \"configs/wgan-gp/wgangp_b64x2_160kiter.py\"");
        assert_eq!(job.launch_command(), format!("sbatch {}", model_dir.join("job.sh").display()));
    }

    #[test]
    fn test_mail_and_quota_directives() {
        let repo = repo_with_config("configs/singan/singan_fish.py");
        let work = tempfile::tempdir().unwrap();
        let mut options = train_options(work.path());
        options.mail = Some("me@example.com".into());
        options.mail_types = vec![MailType::End, MailType::Fail];
        options.quota_type = Some(QuotaType::Spot);
        options.local = true;
        let generator = JobGenerator::new(options).unwrap().with_config_root(repo.path());
        let entry = ModelCatalogEntry::new("singan_fish", "configs/singan/singan_fish.py");

        let script = generator.generate(&entry, 30000).unwrap().unwrap().render_script();
        assert!(script.contains(
            "#SBATCH --gres=gpu:1\n#SBATCH --mail me@example.com\n\
             #SBATCH --mail-type END,FAIL\n#SBATCH --quotatype spot\n#SBATCH --ntasks-per-node=1\n"
        ));
        assert!(script.contains("\npython -u tools/train.py"));
        assert!(script.ends_with("--launcher=none\n"));
    }

    #[test]
    fn test_mail_type_none_suppresses_mail() {
        let repo = repo_with_config("configs/a.py");
        let work = tempfile::tempdir().unwrap();
        let mut options = train_options(work.path());
        options.mail = Some("me@example.com".into());
        options.mail_types = vec![MailType::Begin, MailType::None];
        let generator = JobGenerator::new(options).unwrap().with_config_root(repo.path());

        let job = generator.generate(&ModelCatalogEntry::new("a", "configs/a.py"), 1).unwrap();
        assert!(!job.unwrap().render_script().contains("--mail"));
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let repo = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let generator = JobGenerator::new(train_options(work.path()))
            .unwrap()
            .with_config_root(repo.path());

        let err = generator.generate(&ModelCatalogEntry::new("m", "configs/m.py"), 1).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { ref model, .. } if model == "m"));
        assert!(!work.path().join("m").exists());
    }

    #[test]
    fn test_script_generation_is_idempotent() {
        let repo = repo_with_config("configs/dcgan/dcgan_b128x1.py");
        let work = tempfile::tempdir().unwrap();
        let generator = JobGenerator::new(train_options(work.path()))
            .unwrap()
            .with_config_root(repo.path());
        let entry = ModelCatalogEntry::new("dcgan", "configs/dcgan/dcgan_b128x1.py");
        let script_path = work.path().join("dcgan/job.sh");

        generator.generate(&entry, 29666).unwrap();
        let first = std::fs::read(&script_path).unwrap();
        generator.generate(&entry, 29666).unwrap();
        let second = std::fs::read(&script_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_test_mode_uses_checkpoint_and_eight_gpus() {
        let repo = repo_with_config("configs/dcgan/dcgan_b128x1.py");
        let work = tempfile::tempdir().unwrap();
        let mut options = RunOptions::new(BenchMode::Test, "p");
        options.work_dir = work.path().to_path_buf();
        options.checkpoint_root = Some("/ckpt".into());
        let storage = FakeStorage { present: HashSet::from(["/ckpt/dcgan/dcgan.pth".to_string()]) };
        let generator = JobGenerator::new(options)
            .unwrap()
            .with_storage(Box::new(storage))
            .with_config_root(repo.path());
        let entry = ModelCatalogEntry::new("dcgan", "configs/dcgan/dcgan_b128x1.py")
            .with_weights("https://download.openmmlab.com/mmgen/dcgan/dcgan.pth");

        let job = generator.generate(&entry, 29667).unwrap().unwrap();
        assert_eq!(job.gpus, 8);
        assert_eq!(job.checkpoint.as_deref(), Some("/ckpt/dcgan/dcgan.pth"));
        let model_dir = work.path().join("dcgan");
        assert!(job.render_script().contains(&format!(
            "srun python -u tools/test.py configs/dcgan/dcgan_b128x1.py /ckpt/dcgan/dcgan.pth \
             --work-dir={dir} --out={dir}/result.pkl --launcher=slurm\n",
            dir = model_dir.display()
        )));
    }

    #[test]
    fn test_missing_checkpoint_is_skipped() {
        let repo = repo_with_config("configs/a.py");
        let work = tempfile::tempdir().unwrap();
        let mut options = RunOptions::new(BenchMode::Test, "p");
        options.work_dir = work.path().to_path_buf();
        options.checkpoint_root = Some("/ckpt".into());
        let generator = JobGenerator::new(options)
            .unwrap()
            .with_storage(Box::new(FakeStorage { present: HashSet::new() }))
            .with_config_root(repo.path());
        let entry = ModelCatalogEntry::new("a", "configs/a.py")
            .with_weights("https://download.openmmlab.com/mmgen/a/a.pth");

        match generator.prepare(&entry, 1).unwrap() {
            Generated::Skipped(reason) => assert_eq!(reason, "a: /ckpt/a/a.pth not found."),
            Generated::Job(_) => panic!("expected skip"),
        }
        assert!(generator.generate(&entry, 1).unwrap().is_none());
        assert!(!work.path().join("a/job.sh").exists());
    }

    #[test]
    fn test_test_mode_requires_checkpoint_root() {
        assert!(JobGenerator::new(RunOptions::new(BenchMode::Test, "p")).is_err());
    }
}
