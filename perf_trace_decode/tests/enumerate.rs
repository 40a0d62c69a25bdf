use perf_trace_decode as td;
use perf_trace_types as pt;

/// Builds the bytes of a self-describing EventHeader event: an 8-byte
/// prelude, a single chained-off Metadata extension (event name + field
/// descriptor chain), and the payload data the fields describe.
struct EventBuilder {
    meta: Vec<u8>,
    data: Vec<u8>,
}

impl EventBuilder {
    fn new(event_name: &str) -> Self {
        let mut meta = Vec::new();
        meta.extend_from_slice(event_name.as_bytes());
        meta.push(0);
        Self {
            meta,
            data: Vec::new(),
        }
    }

    fn field_name(&mut self, name: &str) {
        self.meta.extend_from_slice(name.as_bytes());
        self.meta.push(0);
    }

    /// A scalar field with no format byte.
    fn value32(&mut self, name: &str, value: u32) {
        self.field_name(name);
        self.meta.push(pt::FieldEncoding::Value32.as_int());
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// A constant-length array of u16 values, no format byte.
    fn carray_u16(&mut self, name: &str, values: &[u16]) {
        self.field_name(name);
        self.meta.push(
            pt::FieldEncoding::Value16
                .with_flags(pt::FieldEncoding::CArrayFlag)
                .as_int(),
        );
        self.meta
            .extend_from_slice(&(values.len() as u16).to_le_bytes());
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Begins a non-array struct field with `child_count` children; the
    /// caller must follow with exactly `child_count` field definitions
    /// before the struct is implicitly closed by the metadata running out.
    fn struct_begin(&mut self, name: &str, child_count: u8) {
        self.field_name(name);
        self.meta.push(
            pt::FieldEncoding::Struct
                .with_flags(pt::FieldEncoding::ChainFlag)
                .as_int(),
        );
        self.meta.push(child_count);
    }

    /// Assembles the full `event_data` buffer: prelude + Metadata extension + payload.
    fn build(self, level: u8) -> Vec<u8> {
        let mut event_data = Vec::new();

        // EventHeader prelude: flags, version, id, tag, opcode, level.
        event_data.push(0x02 | 0x04); // LittleEndian | Extension
        event_data.push(0); // version
        event_data.extend_from_slice(&0u16.to_le_bytes()); // id
        event_data.extend_from_slice(&0u16.to_le_bytes()); // tag
        event_data.push(pt::Opcode::Info.as_int());
        event_data.push(level);

        // Metadata extension: size, kind (no chain flag, last extension), data.
        event_data.extend_from_slice(&(self.meta.len() as u16).to_le_bytes());
        event_data.extend_from_slice(&5u16.to_le_bytes()); // ExtensionKind::Metadata
        event_data.extend_from_slice(&self.meta);

        event_data.extend_from_slice(&self.data);
        event_data
    }
}

/// Level 4 ("Informational"), keyword 1: tracepoint name must encode both
/// so the enumerator can cross-check them against the header.
const TRACEPOINT_NAME: &str = "Test_L4K1";
const LEVEL: u8 = 4;

fn sample_event_data() -> Vec<u8> {
    let mut b = EventBuilder::new("MyEvent");
    b.value32("count", 7);
    b.carray_u16("items", &[10, 20, 30]);
    b.struct_begin("point", 2);
    b.value32("x", 100);
    b.value32("y", 200);
    b.build(LEVEL)
}

#[test]
fn enumerate_scalar_array_and_struct_fields() {
    let event_data = sample_event_data();
    let mut ctx = td::EventHeaderEnumeratorContext::new();
    let mut e = ctx.enumerate(TRACEPOINT_NAME, &event_data).unwrap();

    assert_eq!(e.event_info().header().level, pt::Level::from_int(LEVEL));

    let mut states = Vec::new();
    let mut names = Vec::new();
    while e.move_next() {
        let ii = e.item_info();
        states.push(e.state());
        names.push(String::from_utf8(ii.name_bytes().to_vec()).unwrap());
    }

    use td::EventHeaderEnumeratorState as S;
    assert_eq!(
        states,
        vec![
            S::Value,      // count
            S::ArrayBegin, // items
            S::Value,      // items[0]
            S::Value,      // items[1]
            S::Value,      // items[2]
            S::ArrayEnd,   // items
            S::StructBegin, // point
            S::Value,      // point.x
            S::Value,      // point.y
            S::StructEnd,  // point
        ]
    );
    assert_eq!(
        names,
        vec![
            "count", "items", "items", "items", "items", "items", "point", "x", "y", "point",
        ]
    );
    assert_eq!(e.state(), S::AfterLastItem);
}

/// `move_next_sibling()` on an array-begin item must skip straight past all
/// of its elements (and the matching array-end) to the next field.
#[test]
fn move_next_sibling_skips_over_carray() {
    let event_data = sample_event_data();
    let mut ctx = td::EventHeaderEnumeratorContext::new();
    let mut e = ctx.enumerate(TRACEPOINT_NAME, &event_data).unwrap();

    use td::EventHeaderEnumeratorState as S;

    assert!(e.move_next());
    assert_eq!(e.state(), S::Value);
    assert_eq!(e.item_info().name_bytes(), b"count");

    assert!(e.move_next());
    assert_eq!(e.state(), S::ArrayBegin);
    assert_eq!(e.item_info().name_bytes(), b"items");

    assert!(e.move_next_sibling());
    assert_eq!(e.state(), S::StructBegin);
    assert_eq!(e.item_info().name_bytes(), b"point");
}

#[test]
fn enumerate_rejects_mismatched_name_level() {
    let event_data = sample_event_data();
    let mut ctx = td::EventHeaderEnumeratorContext::new();
    // Name claims level 5 but the header says level 4.
    assert!(ctx.enumerate("Test_L5K1", &event_data).is_err());
}
