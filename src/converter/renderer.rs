use crate::config::RendererConfig;
use crate::error::{Result, Zip2PdfError};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Turns one HTML file into one PDF file.
pub trait PdfRenderer: Send + Sync {
    fn name(&self) -> &str;

    /// Reports whether the renderer can run at all, without rendering anything.
    fn check(&self) -> Result<()>;

    fn render(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Renders through an external `wkhtmltopdf`-compatible binary invoked as
/// `<binary> <extra args...> <input> <output>`.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    binary: Option<PathBuf>,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl WkhtmltopdfRenderer {
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self {
            binary,
            extra_args: vec!["--quiet".to_string()],
            timeout: None,
            poll_interval: Duration::from_millis(50),
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        let timeout = match config.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self::new(config.binary.clone())
            .with_extra_args(config.extra_args.clone())
            .with_timeout(timeout)
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    fn configured_binary(&self) -> Result<&Path> {
        self.binary
            .as_deref()
            .ok_or(Zip2PdfError::RendererNotConfigured)
    }

    /// Waits for the child, killing it once the deadline passes.
    fn wait_with_deadline(&self, child: &mut Child, file: &str) -> Result<ExitStatus> {
        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => return Ok(child.wait()?),
        };

        let start_time = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(file, error = %e, "lost track of renderer, killing process");
                    kill_and_reap(child);
                    return Err(Zip2PdfError::Io(e));
                }
            }

            if start_time.elapsed() >= timeout {
                tracing::warn!(file, ?timeout, "renderer deadline exceeded, killing process");
                kill_and_reap(child);
                return Err(Zip2PdfError::RendererTimeout {
                    file: file.to_string(),
                    seconds: timeout.as_secs_f64(),
                });
            }

            thread::sleep(self.poll_interval);
        }
    }
}

impl PdfRenderer for WkhtmltopdfRenderer {
    fn name(&self) -> &str {
        "wkhtmltopdf"
    }

    fn check(&self) -> Result<()> {
        let binary = self.configured_binary()?;

        // Bare names are searched on PATH; paths must point at an executable file
        match which::which(binary) {
            Ok(resolved) => {
                tracing::debug!(binary = %resolved.display(), "renderer resolved");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(binary = %binary.display(), error = %e, "renderer lookup failed");
                Err(Zip2PdfError::RendererNotFound {
                    binary: binary.to_path_buf(),
                })
            }
        }
    }

    fn render(&self, input: &Path, output: &Path) -> Result<()> {
        let binary = self.configured_binary()?;
        let file = display_name(input);

        let mut stderr_log = tempfile::tempfile()?;

        tracing::debug!(binary = %binary.display(), input = %input.display(), output = %output.display(), "spawning renderer");

        let mut child = Command::new(binary)
            .args(&self.extra_args)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_log.try_clone()?))
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Zip2PdfError::RendererNotFound {
                    binary: binary.to_path_buf(),
                },
                _ => Zip2PdfError::Io(e),
            })?;

        let status = self.wait_with_deadline(&mut child, &file)?;

        if status.success() {
            return Ok(());
        }

        Err(Zip2PdfError::RendererFailed {
            file,
            status: status.to_string(),
            detail: last_stderr_line(&mut stderr_log),
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn last_stderr_line(stderr_log: &mut File) -> Option<String> {
    let mut captured = String::new();
    stderr_log.seek(SeekFrom::Start(0)).ok()?;
    stderr_log.read_to_string(&mut captured).ok()?;

    captured
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Kills the child and waits for it; the process may already have exited.
fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_unconfigured_renderer() {
        let renderer = WkhtmltopdfRenderer::new(None);
        assert!(matches!(renderer.check(), Err(Zip2PdfError::RendererNotConfigured)));
        assert!(matches!(
            renderer.render(Path::new("a.html"), Path::new("a.pdf")),
            Err(Zip2PdfError::RendererNotConfigured)
        ));
    }

    #[test]
    fn test_missing_binary() {
        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("no-such-renderer");
        let renderer = WkhtmltopdfRenderer::new(Some(binary.clone()));

        assert!(matches!(renderer.check(), Err(Zip2PdfError::RendererNotFound { .. })));

        let result = renderer.render(
            &temp_dir.path().join("a.html"),
            &temp_dir.path().join("a.pdf"),
        );
        match result {
            Err(Zip2PdfError::RendererNotFound { binary: reported }) => assert_eq!(reported, binary),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_from_config() {
        let config = RendererConfig {
            binary: Some(PathBuf::from("/opt/wkhtmltopdf")),
            extra_args: vec!["--quiet".to_string(), "--page-size".to_string(), "A4".to_string()],
            timeout_secs: 30,
        };

        let renderer = WkhtmltopdfRenderer::from_config(&config);
        assert_eq!(renderer.binary(), Some(Path::new("/opt/wkhtmltopdf")));
        assert_eq!(renderer.extra_args.len(), 3);
        assert_eq!(renderer.timeout, Some(Duration::from_secs(30)));

        let unbounded = WkhtmltopdfRenderer::from_config(&RendererConfig::default());
        assert!(unbounded.timeout.is_none());
    }

    #[test]
    fn test_last_stderr_line() {
        let mut file = tempfile::tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"Loading page\nExit with code 1\n\n").unwrap();
        assert_eq!(last_stderr_line(&mut file).as_deref(), Some("Exit with code 1"));

        let mut empty = tempfile::tempfile().unwrap();
        assert!(last_stderr_line(&mut empty).is_none());
    }

    // Scripts run through /bin/sh so the tests never exec a file that was
    // just written.
    #[cfg(unix)]
    fn script_renderer(dir: &Path, body: &str) -> WkhtmltopdfRenderer {
        let script = dir.join("render.sh");
        fs::write(&script, body).unwrap();
        WkhtmltopdfRenderer::new(Some(PathBuf::from("/bin/sh")))
            .with_extra_args(vec![script.to_string_lossy().to_string()])
            .with_poll_interval(Duration::from_millis(10))
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_render() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = script_renderer(temp_dir.path(), "cp \"$1\" \"$2\"\n");
        assert!(renderer.check().is_ok());

        let input = temp_dir.path().join("cust1.html");
        let output = temp_dir.path().join("cust1.pdf");
        fs::write(&input, "<html></html>").unwrap();

        renderer.render(&input, &output).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "<html></html>");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_render_reports_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = script_renderer(
            temp_dir.path(),
            "echo 'Loading pages' >&2\necho 'Exit with code 1 due to network error' >&2\nexit 1\n",
        );

        let input = temp_dir.path().join("cust1.html");
        fs::write(&input, "<html></html>").unwrap();

        match renderer.render(&input, &temp_dir.path().join("cust1.pdf")) {
            Err(Zip2PdfError::RendererFailed { file, detail, .. }) => {
                assert_eq!(file, "cust1.html");
                assert_eq!(detail.as_deref(), Some("Exit with code 1 due to network error"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_render_timeout_kills_process() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = script_renderer(temp_dir.path(), "exec sleep 5\n")
            .with_timeout(Some(Duration::from_millis(200)));

        let input = temp_dir.path().join("slow.html");
        fs::write(&input, "<html></html>").unwrap();

        let start = Instant::now();
        let result = renderer.render(&input, &temp_dir.path().join("slow.pdf"));

        assert!(matches!(result, Err(Zip2PdfError::RendererTimeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_searches_path() {
        let renderer = WkhtmltopdfRenderer::new(Some(PathBuf::from("sh")));
        assert!(renderer.check().is_ok());

        let missing = WkhtmltopdfRenderer::new(Some(PathBuf::from("zip2pdf-no-such-binary")));
        assert!(matches!(missing.check(), Err(Zip2PdfError::RendererNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_rejects_non_executable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("wkhtmltopdf");
        fs::write(&binary, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o644)).unwrap();

        let renderer = WkhtmltopdfRenderer::new(Some(binary));
        assert!(matches!(renderer.check(), Err(Zip2PdfError::RendererNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_kill_and_reap_stops_child() {
        let mut child = Command::new("/bin/sh")
            .args(["-c", "exec sleep 5"])
            .spawn()
            .unwrap();

        let start = Instant::now();
        kill_and_reap(&mut child);

        assert!(child.try_wait().unwrap().is_some());
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
