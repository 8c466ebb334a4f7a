use fnprobe::frontend::{CFrontend, DEFAULT_SYSTEM_PREFIXES};
use fnprobe::instrument::{FunctionStatus, InstrumentOptions, Instrumented, SkipReason, Transformer};

fn instrument(source: &str) -> Instrumented {
    let prefixes = DEFAULT_SYSTEM_PREFIXES
        .iter()
        .map(|p| (*p).to_string())
        .collect();
    let frontend = CFrontend::new()
        .expect("C grammar")
        .with_system_prefixes(prefixes);
    Transformer::new(frontend, InstrumentOptions::default())
        .instrument(source)
        .expect("instrumentation failed")
}

fn skipped(reason: SkipReason) -> FunctionStatus {
    FunctionStatus::Skipped { reason }
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Every `return` in `output` must be directly preceded by the exit probe.
fn assert_returns_guarded(output: &str, name: &str) {
    let exit_call = format!("fnprobe_exit(\"{name}\");");
    for (at, _) in output.match_indices("return") {
        let before = output[..at].trim_end();
        assert!(before.ends_with(&exit_call), "unguarded return at {at}");
    }
}

#[test]
fn test_single_return() {
    let result = instrument("int answer(void)\n{\n    return 42;\n}\n");

    assert_eq!(count(&result.output, "fnprobe_entry(\"answer\");"), 1);
    assert_eq!(count(&result.output, "fnprobe_exit(\"answer\");"), 1);
    assert_returns_guarded(&result.output, "answer");

    let entry = result.output.find("fnprobe_entry(\"answer\")").unwrap();
    let exit = result.output.find("fnprobe_exit(\"answer\")").unwrap();
    assert!(entry < exit);
}

#[test]
fn test_no_return_probes_before_closing_brace() {
    let result = instrument("void tick(int *n)\n{\n    *n += 1;\n}\n");

    assert_eq!(count(&result.output, "fnprobe_exit(\"tick\");"), 1);
    let exit_call = "fnprobe_exit(\"tick\");";
    let exit = result.output.find(exit_call).unwrap();
    let tail = result.output[exit + exit_call.len()..].trim_start();
    assert!(tail.starts_with('}'));
}

#[test]
fn test_multiple_returns_in_nested_blocks() {
    let source = "\
int classify(int x)
{
    if (x < 0) {
        return -1;
    }
    for (int i = 0; i < x; i++) {
        if (i == 3) {
            return i;
        }
    }
    return 0;
}
";
    let result = instrument(source);

    assert_eq!(count(&result.output, "fnprobe_entry(\"classify\");"), 1);
    assert_eq!(count(&result.output, "fnprobe_exit(\"classify\");"), 3);
    assert_returns_guarded(&result.output, "classify");
    let status = &result.functions[0].status;
    assert_eq!(*status, FunctionStatus::Instrumented { exits: 3 });
}

#[test]
fn test_unbraced_return_is_wrapped() {
    let result = instrument("int clamp(int v) {\n    if (v < 0) return 0;\n    return v;\n}\n");

    let wrapped = "if (v < 0) { fnprobe_exit(\"clamp\"); return 0; }";
    assert!(result.output.contains(wrapped));
    assert_eq!(count(&result.output, "fnprobe_exit(\"clamp\");"), 2);
}

#[test]
fn test_main_is_not_instrumented() {
    let source = "static int work(void) { return 1; }\nint main(void) { return work(); }\n";
    let result = instrument(source);

    assert!(result.output.contains("fnprobe_entry(\"work\");"));
    assert!(!result.output.contains("fnprobe_entry(\"main\")"));
    assert!(!result.output.contains("fnprobe_exit(\"main\")"));
    assert_eq!(result.functions[1].status, skipped(SkipReason::EntryPoint));
}

#[test]
fn test_system_header_functions_skipped() {
    let source = "\
# 1 \"app.c\"
# 1 \"/usr/include/stdio_ext.h\" 1 3 4
static inline int sys_helper(void) { return 0; }
# 2 \"app.c\" 2
int app(void) { return 1; }
";
    let result = instrument(source);

    assert!(!result.output.contains("fnprobe_entry(\"sys_helper\")"));
    assert!(result.output.contains("fnprobe_entry(\"app\");"));
    let status = &result.functions[0].status;
    assert_eq!(*status, skipped(SkipReason::SystemHeader));
    // Markers are passed through untouched
    assert!(result.output.contains("# 2 \"app.c\" 2\n"));
}

#[test]
fn test_prototypes_only() {
    let result = instrument("int a(void);\nextern void b(int);\n");
    assert_eq!(result.instrumented_count(), 0);
    assert!(result.output.ends_with("int a(void);\nextern void b(int);\n"));
}

#[test]
fn test_prologue_precedes_original_text() {
    let source = "void f(void) { }\n";
    let result = instrument(source);

    assert!(result.output.starts_with("/* fnprobe instrumentation */\n"));
    assert!(result.output.contains("extern void fnprobe_entry(const char *func_name);"));
    assert!(result.output.contains("extern void fnprobe_exit(const char *func_name);"));
    let hook_call = "setenv(\"FNPROBE_EVENTS\", \"instructions,L1-dcache-load-misses\", 1);";
    assert!(result.output.contains(hook_call));
    let hook = result.output.find("setenv").unwrap();
    let body = result.output.find("void f(void)").unwrap();
    assert!(hook < body);
}

#[test]
fn test_parse_error_reports_position() {
    let frontend = CFrontend::new().unwrap();
    let err = Transformer::new(frontend, InstrumentOptions::default())
        .instrument("int broken(void) {\n    return (1;\n}\n")
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("parse error"), "{message}");
}
