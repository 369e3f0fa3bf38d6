use pretty_assertions::assert_eq;

use m68k_tablegen::emit::{render_entry, render_table, write_table};
use m68k_tablegen::model::parse_opcodes;
use m68k_tablegen::{build, generate, Coverage, EmitConfig, Field, OpcodeSpec, Param};

const OPCODES: &str = include_str!("../data/opcodes.json");

fn line(word: u16) -> String {
    let specs = parse_opcodes(OPCODES).unwrap();
    let table = build(&specs).unwrap();
    render_entry(&EmitConfig::default(), table.lookup(word).unwrap())
}

#[test]
fn fixture_builds_without_collisions() {
    let specs = parse_opcodes(OPCODES).unwrap();
    let table = build(&specs).unwrap();
    assert_eq!(table.len(), 18270);
    let counts: Vec<(&str, usize)> = table
        .opcodes()
        .iter()
        .map(|o| (o.name.as_str(), o.patterns))
        .collect();
    assert_eq!(counts[0], ("move", 9150));
    assert_eq!(counts[2], ("moveq", 2048));
    assert_eq!(counts[12], ("add", 2928));
}

#[test]
fn fixture_lines() {
    assert_eq!(line(0x7012), "table[0x7012] = moveq<0, 18>;");
    assert_eq!(line(0x4e73), "table[0x4e73] = rte;");
    assert_eq!(line(0x5000), "table[0x5000] = addq<8, uint8_t, 0>;");
    assert_eq!(line(0x4000), "table[0x4000] = inst_unimplemented;");
    assert_eq!(line(0x3481), "table[0x3481] = move<uint16_t, 18, 1>;");
    assert_eq!(line(0x4e4f), "table[0x4e4f] = trap<15>;");
    assert_eq!(line(0xd07c), "table[0xd07c] = add<0, 0, uint16_t, 60>;");
    assert_eq!(line(0x2240), "table[0x2240] = movea<uint32_t, 1, 0>;");
}

#[test]
fn fixed_high_byte_example() {
    let specs = vec![OpcodeSpec::new("op", vec![Field::fixed(8, 0xAB), Field::new(8)])];
    let table = build(&specs).unwrap();
    assert_eq!(table.len(), 256);
    for (low, entry) in table.entries().iter().enumerate() {
        assert_eq!(entry.pattern, 0xAB00 | low as u16);
        assert_eq!(entry.handler, "op");
        assert_eq!(entry.params, vec![Param::Raw(low as u16)]);
    }
    let text = render_table(&EmitConfig::default(), &table);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("table[0xab00] = op<0>;"));
    assert_eq!(lines.last(), Some("table[0xabff] = op<255>;"));
}

#[test]
fn render_and_write_agree() {
    let text = generate(
        r#"[{"name": "trap", "pattern": [{"bits": 12, "valid": [1252]}, {"bits": 4, "valid": [0, 1]}]},
            {"name": "nop", "pattern": [{"bits": 16, "valid": [20081], "forceTemplate": true}]}]"#,
        &EmitConfig::default(),
    )
    .unwrap();
    assert_eq!(
        text,
        "table[0x4e40] = trap<0>;\ntable[0x4e41] = trap<1>;\ntable[0x4e71] = nop<20081>;\n"
    );

    let specs = parse_opcodes(OPCODES).unwrap();
    let table = build(&specs).unwrap();
    let cfg = EmitConfig { table: "m_opcode_table".into() };
    let mut buf = Vec::new();
    write_table(&mut buf, &cfg, &table).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), render_table(&cfg, &table));
}

#[test]
fn fixture_coverage() {
    let table = build(&parse_opcodes(OPCODES).unwrap()).unwrap();
    let cov = Coverage::of(&table);
    assert_eq!(cov.claimed, 18270);
    assert_eq!(cov.claimed + cov.unclaimed, 1 << 16);
    assert_eq!(cov.gaps.first().map(|g| g.start), Some(0x0000));
    assert!(cov.gaps.iter().all(|g| !table.occupancy().is_claimed(g.start)));
    let json = serde_json::to_value(&cov).unwrap();
    assert_eq!(json["claimed"], 18270);
}
