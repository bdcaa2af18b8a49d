fn main() {
    println!("cargo:rerun-if-env-changed=PLANTWATER_CONFIG_JSON");

    // ESP-IDF link/env propagation only matters for the firmware image.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
