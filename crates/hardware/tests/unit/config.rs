use pretty_assertions::assert_eq;

use mipsim_core::config::{BusConfig, Config, MemoryConfig};

#[test]
fn defaults_describe_the_standard_layout() {
    let config = Config::default();

    assert!(!config.general.trace);
    assert!(!config.assembler.permissive);
    assert!(!config.cpu.pipelined);
    assert_eq!(config.cpu.frequency_hz, 0);
    assert_eq!(config.cpu.max_cycles, None);
    assert_eq!(config.memory.text_base, 0x0040_0000);
    assert_eq!(config.memory.data_base, 0x1000_0000);
    assert_eq!(config.memory.heap_base, 0x1004_0000);
    assert_eq!(config.memory.stack_pointer, 0x7FFF_EFFC);
    assert_eq!(config.memory.global_pointer, 0x1000_8000);
    assert_eq!(config.bus.workers, 8);
    assert_eq!(config.bus.critical_timeout_ms, 100);
}

#[test]
fn empty_json_is_the_default_config() {
    let config: Config = serde_json::from_str("{}").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn nested_fields_fall_back_individually() {
    let json = r#"{
        "memory": { "heap_size": 4096 },
        "bus": { "queue_capacity": 32 }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(
        config.memory,
        MemoryConfig {
            heap_size: 4096,
            ..MemoryConfig::default()
        }
    );
    assert_eq!(config.bus.workers, 8);
    assert_eq!(config.bus.queue_capacity(), 32);
}

#[test]
fn queue_capacity_defaults_to_worker_count() {
    let bus = BusConfig {
        workers: 5,
        ..BusConfig::default()
    };

    assert_eq!(bus.queue_capacity(), 5);
}
