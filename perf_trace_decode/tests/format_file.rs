use perf_trace_decode as td;

const USER_EVENTS_FORMAT: &str = "name: my_event\n\
ID: 1432\n\
format:\n\
\tfield:unsigned short common_type;\toffset:0;\tsize:2;\tsigned:0;\n\
\tfield:unsigned char common_flags;\toffset:2;\tsize:1;\tsigned:0;\n\
\tfield:unsigned char common_preempt_count;\toffset:3;\tsize:1;\tsigned:0;\n\
\tfield:int common_pid;\toffset:4;\tsize:4;\tsigned:1;\n\
\n\
\tfield:__data_loc char[] msg;\toffset:8;\tsize:4;\tsigned:0;\n\
\tfield:unsigned long addr;\toffset:12;\tsize:8;\tsigned:0;\n\
\tfield:int count;\toffset:20;\tsize:4;\tsigned:1;\n\
\tfield:unsigned char raw[16];\toffset:24;\tsize:16;\tsigned:0;\n\
\n\
print fmt: \"msg=%s addr=%lx count=%d\", __get_str(msg), REC->addr, REC->count\n";

/// Parsing a realistic tracefs `format` block should recover name/ID, the
/// common-field run, and per-field layout/encoding deductions, and
/// re-serializing it should reproduce the field table byte-for-byte.
#[test]
fn parse_and_rewrite_user_events_format() {
    let format = td::PerfEventFormat::parse(true, "user_events", USER_EVENTS_FORMAT).unwrap();

    assert_eq!(format.system_name(), "user_events");
    assert_eq!(format.name(), "my_event");
    assert_eq!(format.id(), 1432);
    assert_eq!(format.common_field_count(), 4);
    assert_eq!(format.common_fields_size(), 8);
    assert_eq!(
        format.decoding_style(),
        td::PerfEventDecodingStyle::TraceEventFormat
    );

    let fields = format.fields();
    assert_eq!(fields.len(), 8);

    let msg = &fields[4];
    assert_eq!(msg.name(), "msg");
    assert_eq!(msg.offset(), 8);
    assert_eq!(msg.size(), 4);
    assert_eq!(msg.array(), td::PerfFieldArray::DataLoc4);

    let addr = &fields[5];
    assert_eq!(addr.name(), "addr");
    assert_eq!(addr.size(), 8);
    assert_eq!(addr.signed(), Some(false));

    let raw = &fields[7];
    assert_eq!(raw.name(), "raw");
    assert_eq!(raw.array(), td::PerfFieldArray::Fixed);
    assert_eq!(raw.deduced_array_count(), 16);

    let mut rewrite = String::new();
    format.write_to(&mut rewrite).unwrap();

    // write_to() doesn't reproduce print_fmt's argument list (only the
    // format string itself isn't tracked), so compare the field table
    // rather than the full text.
    assert!(rewrite.contains("name: my_event"));
    assert!(rewrite.contains("ID: 1432"));
    for field in fields {
        assert!(rewrite.contains(&format!(
            "field:{};\toffset:{};\tsize:{};",
            field.field(),
            field.offset(),
            field.size(),
        )));
    }
}

/// EventHeader-style tracepoints are recognized by the synthetic
/// "eventheader_flags" field immediately following the common fields.
const EVENTHEADER_FORMAT: &str = "name: MyProvider_L4K1\n\
ID: 9001\n\
format:\n\
\tfield:unsigned short common_type;\toffset:0;\tsize:2;\tsigned:0;\n\
\tfield:unsigned char common_flags;\toffset:2;\tsize:1;\tsigned:0;\n\
\tfield:unsigned char common_preempt_count;\toffset:3;\tsize:1;\tsigned:0;\n\
\tfield:int common_pid;\toffset:4;\tsize:4;\tsigned:1;\n\
\n\
\tfield:unsigned char eventheader_flags;\toffset:8;\tsize:1;\tsigned:0;\n\
\tfield:unsigned char version;\toffset:9;\tsize:1;\tsigned:0;\n\
\tfield:unsigned short id;\toffset:10;\tsize:2;\tsigned:0;\n\
\tfield:unsigned short tag;\toffset:12;\tsize:2;\tsigned:0;\n\
\tfield:unsigned char opcode;\toffset:14;\tsize:1;\tsigned:0;\n\
\tfield:unsigned char level;\toffset:15;\tsize:1;\tsigned:0;\n\
\tfield:__rel_loc unsigned char[] payload;\toffset:16;\tsize:4;\tsigned:0;\n\
\n\
print fmt: \"%s\", __get_str(payload)\n";

#[test]
fn detects_eventheader_decoding_style() {
    let format = td::PerfEventFormat::parse(true, "user_events", EVENTHEADER_FORMAT).unwrap();
    assert_eq!(
        format.decoding_style(),
        td::PerfEventDecodingStyle::EventHeader
    );

    let payload = &format.fields()[10];
    assert_eq!(payload.array(), td::PerfFieldArray::RelLoc4);
}

/// Missing "ID:" (or an empty "name:") makes the format unusable; parse()
/// reports that with None rather than a half-initialized value.
#[test]
fn parse_rejects_format_without_id() {
    let text = "name: incomplete\nformat:\n\tfield:int x;\toffset:0;\tsize:4;\tsigned:1;\n\n";
    assert!(td::PerfEventFormat::parse(true, "user_events", text).is_none());
}
