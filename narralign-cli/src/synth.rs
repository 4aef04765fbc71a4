//! Speech synthesis through an external TTS command.

use eyre::Context;
use narralign::traits::{BoxError, SpeechSynthesizer, SynthesisRequest};
use std::io::Write;
use std::process::{Command, Stdio};

/// Placeholder replaced by the output WAV path in the command template.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Environment variable carrying the preceding segment's text.
pub const PREV_TEXT_ENV: &str = "NARRALIGN_PREV_TEXT";

/// Environment variable carrying the following segment's text.
pub const NEXT_TEXT_ENV: &str = "NARRALIGN_NEXT_TEXT";

/// Runs a TTS command once per segment.
///
/// The template is split with shell quoting rules, so
/// `sh -c 'tts > {output}'` passes one script argument. Every `{output}` is
/// replaced by the WAV path to write. Narration is written to the command's stdin.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// Parse a command template such as `piper --output_file {output}`.
    pub fn from_template(template: &str) -> eyre::Result<Self> {
        let mut parts = shell_words::split(template)
            .wrap_err_with(|| format!("invalid tts command template: {template:?}"))?
            .into_iter();
        let program = parts
            .next()
            .ok_or_else(|| eyre::eyre!("tts command template is empty"))?;
        let args: Vec<String> = parts.collect();

        if !args.iter().any(|arg| arg.contains(OUTPUT_PLACEHOLDER)) {
            eyre::bail!("tts command template must contain {OUTPUT_PLACEHOLDER}");
        }

        Ok(Self { program, args })
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<(), BoxError> {
        let output = request.output.to_string_lossy();
        let args = self
            .args
            .iter()
            .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output));

        tracing::debug!(index = request.index, program = %self.program, "running tts command");

        let result = Command::new(&self.program)
            .args(args)
            .env(PREV_TEXT_ENV, request.previous_text.unwrap_or_default())
            .env(NEXT_TEXT_ENV, request.next_text.unwrap_or_default())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .and_then(|mut child| {
                if let Some(stdin) = child.stdin.as_mut() {
                    stdin.write_all(request.text.as_bytes())?;
                }
                child.wait_with_output()
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let message = format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            );
            return Err(message.into());
        }

        Ok(())
    }
}

/// Stand-in used when no TTS command is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unconfigured;

impl SpeechSynthesizer for Unconfigured {
    fn synthesize(&mut self, _: &SynthesisRequest<'_>) -> Result<(), BoxError> {
        Err("no tts command configured".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_template() {
        let synth = CommandSynthesizer::from_template("piper --model en.onnx -f {output}").unwrap();

        assert_eq!(synth.program, "piper");
        assert_eq!(synth.args, ["--model", "en.onnx", "-f", "{output}"]);
    }

    #[test]
    fn quoted_arguments_stay_whole() {
        let synth = CommandSynthesizer::from_template("sh -c 'tts --out {output}'").unwrap();

        assert_eq!(synth.program, "sh");
        assert_eq!(synth.args, ["-c", "tts --out {output}"]);
    }

    #[test]
    fn rejects_template_without_output() {
        assert!(CommandSynthesizer::from_template("piper --model en.onnx").is_err());
        assert!(CommandSynthesizer::from_template("   ").is_err());
        assert!(CommandSynthesizer::from_template("sh -c 'cat > {output}").is_err());
    }

    fn request<'a>(output: &'a std::path::Path) -> SynthesisRequest<'a> {
        SynthesisRequest {
            index: 1,
            text: "Hello",
            previous_text: Some("Before"),
            next_text: None,
            output,
        }
    }

    #[cfg(unix)]
    #[test]
    fn narration_is_written_to_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("segment_1.wav");
        let mut synth = CommandSynthesizer::from_template("sh -c 'cat > \"$0\"' {output}").unwrap();

        synth.synthesize(&request(&output)).unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello");
    }

    #[cfg(unix)]
    #[test]
    fn context_is_passed_in_env() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("segment_1.wav");
        let mut synth = CommandSynthesizer::from_template("sh -c env>{output}").unwrap();

        synth.synthesize(&request(&output)).unwrap();

        let env = std::fs::read_to_string(&output).unwrap();
        assert!(env.lines().any(|line| line == "NARRALIGN_PREV_TEXT=Before"));
        assert!(env.lines().any(|line| line == "NARRALIGN_NEXT_TEXT="));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("segment_1.wav");
        let mut synth = CommandSynthesizer::from_template("sh -c cat>{output}/nested").unwrap();

        assert!(synth.synthesize(&request(&output)).is_err());
    }

    #[test]
    fn unconfigured_always_fails() {
        let output = std::path::Path::new("segment_1.wav");

        assert!(Unconfigured.synthesize(&request(output)).is_err());
    }
}
