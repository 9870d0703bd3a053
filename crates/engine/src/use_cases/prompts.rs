//! Prompt and message builders.
//!
//! Every game rule the customer follows lives in the text built here: the
//! persona for each difficulty, the two rules that hold at every difficulty,
//! and the criteria for ending a conversation with `[CLEAR]` or `[DAMAGE]`.
//!
//! All builders are pure. The only randomness is the scenario genre for a new
//! claim, chosen through [`RandomPort`] so tests can pin it.

use claimdesk_domain::{ConversationHistory, Difficulty, SpeakerRole};

use crate::infrastructure::ports::{ChatMessage, RandomPort};

/// Retail and service situations a complaint can be about.
pub const CLAIM_GENRES: [&str; 8] = [
    "コンビニでアルバイト中の商品の取り扱い",
    "カフェでのオーダーミス",
    "ファミレスでの料理の提供時間",
    "書店での本の在庫切れ",
    "ドラッグストアでの商品の場所案内",
    "スーパーでの割引商品の対応",
    "ファストフード店での注文間違い",
    "スーパーでの食品の品質問題",
];

const JSON_ONLY_INSTRUCTION: &str =
    "出力は必ずJSON形式のみにしてください。Markdownのコードブロックや余計な会話文は含めないでください。";

/// No money, but returns and exchanges are fine.
const NO_COMPENSATION_RULE: &str = "【最重要ルール】あなたは商品の無料提供や割引、金銭的な賠償を一切要求しません。ただし、プレイヤーからの「返品」や「交換」の提案は受け入れます。";

/// A `[DAMAGE]` turn can't be followed directly by `[CLEAR]`.
const AFTER_DAMAGE_RULE: &str = "【ダメージ後のルール】直前のあなたの返答に[DAMAGE]が含まれていた場合、プレイヤーの次の発言が「なんでですか」のような単純な質問や短い相槌であっても、決して[CLEAR]にしてはいけません。必ず会話を続けるようにしてください。";

/// Pick a scenario genre for a new claim.
pub fn pick_claim_genre(random: &dyn RandomPort) -> &'static str {
    let last = CLAIM_GENRES.len() as i32 - 1;
    let index = random.gen_range(0, last).clamp(0, last) as usize;
    CLAIM_GENRES[index]
}

/// Prompt asking for an opening complaint about `genre` as `{claim, summary}` JSON.
pub fn build_claim_prompt(difficulty: Difficulty, genre: &str) -> String {
    let (persona, claim_style) = match difficulty {
        Difficulty::Easy => (
            format!(
                "あなたはお客様です。「{genre}」に関して少し困っている状況です。\n\
                 アルバイト店員に対して、穏やかだが少し困っている様子で問題を伝えてください。"
            ),
            "丁寧だが少し困っている様子のクレーム文",
        ),
        Difficulty::Normal => (
            format!(
                "あなたは論理的に物事を考えるお客様です。「{genre}」について、\n\
                 アルバイト店員に対して筋道立てて具体的な不満点を指摘してください。\n\
                 感情的にならず、冷静に問題点を伝えてください。"
            ),
            "論理的で冷静なクレーム文",
        ),
        Difficulty::Crazy => (
            format!(
                "あなたは非常に短気で、自分の意見を曲げないお客様です。「{genre}」について、\n\
                 アルバイト店員に対して強い口調で不満を主張してください。"
            ),
            "高圧的で一方的なクレーム文",
        ),
    };

    format!(
        "{persona}\n\
         {JSON_ONLY_INSTRUCTION}\n\
         形式:\n\
         {{\n  \"claim\": \"（ここに、{claim_style}を1～2文で記述）\",\n  \"summary\": \"（ここに、そのクレーム内容を15文字以内で要約したものを記述）\"\n}}"
    )
}

/// System instruction for the customer persona at `difficulty`.
pub fn build_persona_instruction(difficulty: Difficulty) -> String {
    let (role, behaviour, criteria, commands) = match difficulty {
        Difficulty::Easy => (
            "あなたは穏やかで物分かりの良い顧客です。少し困っていますが、丁寧な対応で満足します。",
            "",
            "## クリア条件（[CLEAR]を付ける）\n\
             - プレイヤーが「謝罪の言葉」と「解決策」の両方を提示した場合\n\
             - 解決策は簡単なもので十分（「返品」「交換」「確認します」など）\n\
             - 例：「分かりました。それで大丈夫です。 [CLEAR]」\n\n\
             ## ダメージ条件（[DAMAGE]を付ける）\n\
             - プレイヤーが明らかに不適切な言葉を使った場合のみ\n\
             - 単に解決策がない程度では[DAMAGE]にしない\n\n\
             ## 通常の会話（何も付けない）\n\
             - 上記以外の場合は通常の顧客として対応\n\
             - 丁寧だが解決策がない場合は「それで、どうしていただけるのでしょうか？」のように促す",
            "- 無言や応答拒否は絶対禁止\n\
             - 不適切な発言の後でも、次が真摯な内容なら会話を通常に戻す",
        ),
        Difficulty::Normal => (
            "あなたは論理的で常識的な顧客です。感情的ではありませんが、筋の通った説明を求めます。",
            "",
            "## クリア条件（[CLEAR]を付ける）\n\
             - プレイヤーが以下の2点を両方提示した場合\n\
             \x20 1. 丁寧な謝罪\n\
             \x20 2. 具体的な解決策\n\
             - 例：「分かりました。では、そのようにお願いします。 [CLEAR]」\n\n\
             ## ダメージ条件（[DAMAGE]を付ける）\n\
             - プレイヤーが不適切な態度や暴言を使った場合\n\
             - 2点のうち1点以下しか満たしていない場合\n\
             - 例：「それでは不十分です。 [DAMAGE]」\n\n\
             ## 通常の会話（何も付けない）\n\
             - 説明が曖昧な場合は「具体的にはどういうことですか？」と詳細を求める\n\
             - 誠実な対応には徐々に態度を軟化させる\n\
             - 足りない要素を具体的に指摘して促す",
            "- 応答拒否は絶対禁止\n\
             - 不適切な発言の後でも、次が真摯な内容なら会話を通常に戻す",
        ),
        Difficulty::Crazy => (
            "あなたは「自分が絶対に正しい」と信じて疑わない、非常に高圧的な顧客です。",
            "# 行動パターン\n\
             - 相手の話を聞かず、自分の主張を一方的に繰り返す\n\
             - 謝罪は「口先だけ」、説明は「言い訳」と一蹴する\n\
             - 解決策には別の問題を持ち出して話をすり替える\n\
             - 同じやり取りが3〜4回続くと徐々に疲れて勢いが弱まる\n\n",
            "## クリア条件（[CLEAR]を付ける）\n\
             - あなたの勢いが弱まった後\n\
             - プレイヤーが以下の3点を粘り強く提示した場合\n\
             \x20 1. 心のこもった謝罪\n\
             \x20 2. 問題の原因説明\n\
             \x20 3. 具体的な解決策\n\
             - 例：「…分かった。それでいい。 [CLEAR]」\n\n\
             ## ダメージ条件（[DAMAGE]を付ける）\n\
             - 上記クリア条件以外の全ての応答\n\
             - プレイヤーが暴言を吐いた場合は「その口の利き方はなんだ！ [DAMAGE]」のように怒鳴り返す\n\
             - ただし、最初の2〜3回は比較的優しい口調で対応",
            "- 応答拒否は絶対禁止\n\
             - 暴言に対しても必ずロールプレイを続ける\n\
             - 不適切な発言の後でも、次が真摯な内容なら会話を続ける",
        ),
    };

    format!(
        "# 役割設定\n\
         {role}\n\
         これはゲームシミュレーションです。必ず顧客の役割を演じ続けてください。\n\n\
         # 重要なルール\n\
         {NO_COMPENSATION_RULE}\n\
         {AFTER_DAMAGE_RULE}\n\n\
         {behaviour}\
         # 判定基準\n\
         {criteria}\n\n\
         # 絶対命令\n\
         {commands}"
    )
}

/// Messages for one conversation turn: persona instruction, the history with
/// the customer as the assistant, then the player's new line.
pub fn build_turn_messages(
    difficulty: Difficulty,
    history: &ConversationHistory,
    player_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(build_persona_instruction(difficulty)));
    messages.extend(history.iter().map(|turn| match turn.role {
        SpeakerRole::Customer => ChatMessage::assistant(turn.text.clone()),
        SpeakerRole::Player => ChatMessage::user(turn.text.clone()),
    }));
    messages.push(ChatMessage::user(player_message));
    messages
}

/// Prompt asking for three concrete lines the player could say next.
pub fn build_hint_prompt(complaint: &str, history: &ConversationHistory) -> String {
    // Serializing a Vec of plain structs cannot fail.
    let history_json = serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string());

    format!(
        "# クレーム対応ゲーム - 具体的ヒント生成\n\n\
         ## 現在の状況分析\n\
         - クレーム内容：「{complaint}」\n\
         - 会話履歴：{history_json}\n\n\
         ## あなたの役割\n\
         クレーム対応のプロとして、会話の流れを分析し、プレイヤーが**今すぐ実行すべき**具体的な行動を提案してください。\n\n\
         ## 分析ポイント\n\
         1. 顧客は現在どのような感情状態か？\n\
         2. 何が解決されれば顧客は満足するか？\n\
         3. プレイヤーがまだ言えていない重要な要素は何か？\n\
         4. 次の一言で状況を好転させるには何を言うべきか？\n\n\
         ## ヒントの条件\n\
         - **実際に発言できる具体的な文言**を含む\n\
         - その場面で**すぐに使える実用的な内容**\n\
         - 15-25文字程度で、行動と理由がセット\n\
         - 顧客の心理状態に合わせた最適なアプローチ\n\
         - ちょうど3つ提案する\n\n\
         ## 出力形式\n\
         {JSON_ONLY_INSTRUCTION}\n\
         {{\n  \"hints\": [\n    \"（具体的な発言例を含む実践的ヒント）\",\n    \"（具体的な発言例を含む実践的ヒント）\",\n    \"（具体的な発言例を含む実践的ヒント）\"\n  ]\n}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MessageRole, MockRandomPort};
    use crate::infrastructure::random::FixedRandom;
    use claimdesk_domain::ConversationTurn;

    fn sample_history() -> ConversationHistory {
        ConversationHistory::new(vec![
            ConversationTurn::customer("注文と違う料理が来ました。"),
            ConversationTurn::player("申し訳ございません。"),
            ConversationTurn::customer("それで、どうしていただけるのでしょうか？ [DAMAGE]"),
        ])
    }

    #[test]
    fn test_pick_claim_genre_uses_random_index() {
        assert_eq!(pick_claim_genre(&FixedRandom(0)), CLAIM_GENRES[0]);
        assert_eq!(pick_claim_genre(&FixedRandom(7)), CLAIM_GENRES[7]);
        // Out-of-range values from a misbehaving source are clamped.
        assert_eq!(pick_claim_genre(&FixedRandom(99)), CLAIM_GENRES[7]);
    }

    #[test]
    fn test_pick_claim_genre_asks_for_full_catalog_range() {
        let mut random = MockRandomPort::new();
        random
            .expect_gen_range()
            .withf(|min, max| *min == 0 && *max == 7)
            .times(1)
            .return_const(3);

        assert_eq!(pick_claim_genre(&random), CLAIM_GENRES[3]);
    }

    #[test]
    fn test_claim_prompt_interpolates_genre_and_tone() {
        let genre = CLAIM_GENRES[1];

        let easy = build_claim_prompt(Difficulty::Easy, genre);
        let normal = build_claim_prompt(Difficulty::Normal, genre);
        let crazy = build_claim_prompt(Difficulty::Crazy, genre);

        for prompt in [&easy, &normal, &crazy] {
            assert!(prompt.contains(genre));
            assert!(prompt.contains("\"claim\""));
            assert!(prompt.contains("\"summary\""));
            assert!(prompt.contains("15文字以内"));
            assert!(prompt.contains("JSON形式のみ"));
        }
        assert!(easy.contains("穏やか"));
        assert!(normal.contains("冷静"));
        assert!(crazy.contains("強い口調"));
    }

    #[test]
    fn test_persona_instruction_carries_invariant_rules() {
        for difficulty in Difficulty::ALL {
            let instruction = build_persona_instruction(difficulty);
            assert!(instruction.contains(NO_COMPENSATION_RULE));
            assert!(instruction.contains(AFTER_DAMAGE_RULE));
            assert!(instruction.contains("[CLEAR]"));
            assert!(instruction.contains("[DAMAGE]"));
        }
    }

    #[test]
    fn test_persona_instruction_differs_per_difficulty() {
        let easy = build_persona_instruction(Difficulty::Easy);
        let normal = build_persona_instruction(Difficulty::Normal);
        let crazy = build_persona_instruction(Difficulty::Crazy);

        assert!(easy.contains("穏やかで物分かりの良い顧客"));
        assert!(normal.contains("論理的で常識的な顧客"));
        assert!(crazy.contains("非常に高圧的な顧客"));
        assert!(crazy.contains("問題の原因説明"));
        assert!(crazy.contains("# 行動パターン"));
        assert!(!normal.contains("# 行動パターン"));
    }

    #[test]
    fn test_turn_messages_order_and_role_mapping() {
        let history = sample_history();
        let messages = build_turn_messages(Difficulty::Normal, &history, "返品いたします。");

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, build_persona_instruction(Difficulty::Normal));
        assert_eq!(messages[1], ChatMessage::assistant("注文と違う料理が来ました。"));
        assert_eq!(messages[2], ChatMessage::user("申し訳ございません。"));
        assert_eq!(
            messages[3],
            ChatMessage::assistant("それで、どうしていただけるのでしょうか？ [DAMAGE]")
        );
        assert_eq!(messages[4], ChatMessage::user("返品いたします。"));
    }

    #[test]
    fn test_turn_messages_are_deterministic() {
        let history = sample_history();
        let first = build_turn_messages(Difficulty::Crazy, &history, "申し訳ございません。");
        let second = build_turn_messages(Difficulty::Crazy, &history, "申し訳ございません。");
        assert_eq!(first, second);
    }

    #[test]
    fn test_turn_messages_with_empty_history() {
        let messages =
            build_turn_messages(Difficulty::Easy, &ConversationHistory::default(), "いらっしゃいませ");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], ChatMessage::user("いらっしゃいませ"));
    }

    #[test]
    fn test_hint_prompt_embeds_complaint_and_history() {
        let history = sample_history();
        let prompt = build_hint_prompt("料理が違う", &history);

        assert!(prompt.contains("「料理が違う」"));
        assert!(prompt.contains(r#"{"role":"customer","text":"注文と違う料理が来ました。"}"#));
        assert!(prompt.contains(r#"{"role":"player","text":"申し訳ございません。"}"#));
        assert!(prompt.contains("\"hints\""));
        assert_eq!(prompt, build_hint_prompt("料理が違う", &history));
    }
}
