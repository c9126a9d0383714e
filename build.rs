fn main() {
    // Only the device build links against ESP-IDF; host tests skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
