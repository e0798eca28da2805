fn main() {
    // 主机上构建校验工具时没有 ESP-IDF 环境
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
