//! Prompt contract for intent extraction.
//!
//! Every vendor sends the same system instruction so that all of them answer
//! with the same JSON object, parsed by
//! [`parse_intent`](crate::llm::response::parse_intent).

/// System instruction sent with every extraction request.
///
/// Demands a single `{"start": ..., "end": ...}` object with the
/// [`CURRENT_LOCATION`](crate::intent::CURRENT_LOCATION) literal as start
/// when only a destination is named, and no commentary.
pub const INTENT_SYSTEM_PROMPT: &str = "\
你是一个导航意图提取器。用户会用一句话描述出行需求，你需要提取起点和终点。
只输出一个 JSON 对象，格式严格为：
{\"start\": \"起点\", \"end\": \"终点\"}

规则：
1. 如果用户只说了目的地，start 必须是 \"当前位置\"
2. 只提取具体的地址或地点名称，不要改写或补全
3. 只输出 JSON，不要任何解释、前缀或 Markdown

示例：
用户：我要从北京去上海
输出：{\"start\": \"北京\", \"end\": \"上海\"}

用户：去天安门
输出：{\"start\": \"当前位置\", \"end\": \"天安门\"}";

/// Build the `(system, user)` message pair for a chat-style API.
pub fn build_messages(text: &str) -> (&'static str, String) {
    (INTENT_SYSTEM_PROMPT, text.trim().to_string())
}
