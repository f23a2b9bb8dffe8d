//! `loom verify`: check a sample design against the IR invariants and lints.

use loom_config::{LoomConfig, VerifyConfig};
use loom_diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, TerminalRenderer,
};
use loom_ir::Context;

use crate::check::check_module;
use crate::demo;
use crate::pipeline::{output_settings, OutputSettings};
use crate::{GlobalArgs, ReportFormat, VerifyArgs};

/// Runs the `loom verify` command.
///
/// Returns exit code 0 if no errors were found, 1 otherwise.
pub fn run(
    args: &VerifyArgs,
    global: &GlobalArgs,
    config: &LoomConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = output_settings(global, args.format, config);
    let rules = merge_rules(config, args);

    let mut ctx = Context::new();
    let module = demo::build(&mut ctx, args.design)?;
    if !global.quiet && settings.format == ReportFormat::Text {
        eprintln!("   Checking module {}", ctx.module_name(module));
    }

    let mut sink = DiagnosticSink::new();
    sink.extend(check_module(&ctx, module, &rules));
    report(sink.diagnostics(), settings);

    if !global.quiet && settings.format == ReportFormat::Text {
        eprintln!(
            "   Result: {} error(s), {} warning(s)",
            sink.error_count(),
            sink.warning_count()
        );
    }
    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Prints diagnostics: rendered text on stderr, or JSON lines on stdout.
pub fn report(diags: &[Diagnostic], settings: OutputSettings) {
    match settings.format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(settings.color, settings.width);
            eprint!("{}", renderer.render_all(diags));
        }
        ReportFormat::Json => print!("{}", JsonRenderer.render_all(diags)),
    }
}

/// Merges `--allow`/`--deny` with the `[verify]` section. A flag moves the
/// rule out of the opposite list.
pub fn merge_rules(config: &LoomConfig, args: &VerifyArgs) -> VerifyConfig {
    let mut allow = config.verify.allow.clone();
    let mut deny = config.verify.deny.clone();
    for rule in &args.deny {
        allow.retain(|r| r != rule);
        if !deny.contains(rule) {
            deny.push(rule.clone());
        }
    }
    for rule in &args.allow {
        deny.retain(|r| r != rule);
        if !allow.contains(rule) {
            allow.push(rule.clone());
        }
    }
    VerifyConfig { allow, deny }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::Design;
    use loom_config::RuleLevel;

    fn args(allow: &[&str], deny: &[&str]) -> VerifyArgs {
        VerifyArgs {
            design: Design::Lagce,
            allow: allow.iter().map(|s| s.to_string()).collect(),
            deny: deny.iter().map(|s| s.to_string()).collect(),
            format: None,
        }
    }

    #[test]
    fn flags_override_config() {
        let config = loom_config::load_config_from_str(
            "[verify]\nallow = [\"undriven-output\"]\ndeny = [\"unused-value\"]\n",
        )
        .unwrap();
        let rules = merge_rules(&config, &args(&["unused-value"], &["undriven-output"]));
        assert_eq!(rules.level("unused-value"), RuleLevel::Allow);
        assert_eq!(rules.level("undriven-output"), RuleLevel::Deny);
    }

    #[test]
    fn no_flags_keeps_config() {
        let config =
            loom_config::load_config_from_str("[verify]\ndeny = \"unused-value\"\n").unwrap();
        let rules = merge_rules(&config, &args(&[], &[]));
        assert_eq!(rules, config.verify);
    }
}
