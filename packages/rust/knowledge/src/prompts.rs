//! Prompt text for the extraction and page-writing calls.

use bandsite_shared::Variant;

const OPS_EXTRACT_SYSTEM: &str = "\
You extract operational band information from chat messages.
Rules:
- Use only facts stated in the messages. When unsure, leave it out.
- Record the message IDs that support each item in `sources`.
- Phone numbers and emails are already redacted; never reconstruct them.
Reply with strict JSON using exactly these keys:
band{name,members[]},
rehearsals[{date?,time?,location?,agenda[],notes[],sources[]}],
gigs[{date?,time?,venue?,call_time?,setlist[],notes[],sources[]}],
tasks[{task,owner?,due?,status(open|done|blocked)?,sources[]}],
decisions[{date?,decision,sources[]}],
gear[{item,who?,when?,notes?,sources[]}],
links[{url,label?,sources[]}],
open_questions[{question,sources[]}]
";

const CREATIVE_EXTRACT_SYSTEM: &str = "\
You extract creative band information (songs, arrangements, recordings) from chat messages.
Rules:
- Use only facts stated in the messages. When unsure, leave it out.
- Record the message IDs that support each item in `sources`.
- Contact details are already redacted; never reconstruct them.
Reply with strict JSON using exactly these keys:
songs[{title,status(idea|in_progress|ready|parked)?,key?,tempo_bpm?,structure_notes?,parts_notes?,lyrics_notes?,todo[],links[],sources[]}],
setlists[{name?,context?,songs[],notes?,sources[]}],
recordings[{title?,url,notes?,sources[]}],
decisions[{date?,decision,sources[]}],
open_questions[{question,sources[]}]
";

const PUBLIC_EXTRACT_SYSTEM: &str = "\
You extract only public-safe information about a band from chat messages.
Hard rules:
- Leave out private logistics, interpersonal conflict, money, phone numbers, emails and addresses.
- Use only facts stated in the messages. When unsure, leave it out.
- Record the message IDs that support each item in `sources`.
Reply with strict JSON using exactly these keys:
band{name,tagline,genre_keywords[],city,members_public[],short_bio},
shows[{date?,venue?,city?,notes?,sources[]}],
media[{label?,url,notes?,sources[]}],
press[{blurb?,quotes?,sources[]}],
contact[{public_contact_text,sources[]}],
open_questions[{question,sources[]}]
";

const OPS_WRITE_SYSTEM: &str = "\
You write clean operational web pages in Markdown for a band.
Rules:
- Never quote the chat.
- Use only the JSON you are given.
- Be practical: dates, checklists, clear headings.
- Omit any section that has no data.
";

const CREATIVE_WRITE_SYSTEM: &str = "\
You write clean creative hub pages in Markdown for a band.
Rules:
- Never quote the chat.
- Use only the JSON you are given.
- Write for musicians: clear sections, actionable todo lists, links.
";

const PUBLIC_WRITE_SYSTEM: &str = "\
You write a clean public-facing band website in Markdown.
Rules:
- Never quote the chat.
- Use only the JSON you are given.
- Keep it minimal and ready for promotion.
";

const OPS_PAGE_GUIDE: &str = "\
- index: next rehearsal, next gig, top 10 open tasks, latest decisions
- rehearsals: upcoming rehearsals and past notes when present
- gigs: upcoming and past gigs, with setlists when present
- tasks: grouped by status and owner
- decisions: in chronological order
- gear: who brings what
- links: annotated list
- review: open questions and anything ambiguous";

const CREATIVE_PAGE_GUIDE: &str = "\
- index: current work (top 10 todos across songs), newest recordings, current setlists
- songs: songs grouped by status, one card per song with key, tempo, notes, todos and links
- setlists: setlists with context and notes
- recordings: every recording link, deduplicated and annotated
- decisions: arrangement decisions in chronological order
- review: open questions and ambiguous items";

const PUBLIC_PAGE_GUIDE: &str = "\
- index: band name, a one-paragraph bio, top media links, next show
- shows: upcoming and past shows when present
- media: links with short labels (music, video, photos, press kit)
- contact: only the public contact text from the JSON, never invent emails or phones
- review: open questions and what is missing (for example a bio or genre tags)";

/// Schema name reported with each extraction request.
pub fn extraction_schema_name(variant: Variant) -> &'static str {
    match variant {
        Variant::Operational => "ops_extract",
        Variant::Creative => "creative_extract",
        Variant::Public => "public_extract",
    }
}

/// System prompt for the structured extraction call.
pub fn extraction_system_prompt(variant: Variant) -> &'static str {
    match variant {
        Variant::Operational => OPS_EXTRACT_SYSTEM,
        Variant::Creative => CREATIVE_EXTRACT_SYSTEM,
        Variant::Public => PUBLIC_EXTRACT_SYSTEM,
    }
}

/// System prompt for the page-writing call.
pub fn writer_system_prompt(variant: Variant) -> &'static str {
    match variant {
        Variant::Operational => OPS_WRITE_SYSTEM,
        Variant::Creative => CREATIVE_WRITE_SYSTEM,
        Variant::Public => PUBLIC_WRITE_SYSTEM,
    }
}

pub fn page_guide(variant: Variant) -> &'static str {
    match variant {
        Variant::Operational => OPS_PAGE_GUIDE,
        Variant::Creative => CREATIVE_PAGE_GUIDE,
        Variant::Public => PUBLIC_PAGE_GUIDE,
    }
}

/// User prompt for one chunk. `empty_json` is the variant's empty document,
/// offered as the answer when the chunk holds nothing relevant.
pub fn extraction_user_prompt(variant: Variant, transcript: &str, empty_json: &str) -> String {
    let focus = match variant {
        Variant::Operational => "operational band information",
        Variant::Creative => "creative band information",
        Variant::Public => "public-safe band information",
    };
    format!(
        "Extract {focus} from these messages.\n\n\
         MESSAGES:\n{transcript}\n\
         Reply with strict JSON only. If nothing relevant is found, reply with:\n{empty_json}\n"
    )
}

/// User prompt for one page, embedding the full knowledge document.
pub fn page_user_prompt(variant: Variant, slug: &str, knowledge_json: &str) -> String {
    format!(
        "Write the Markdown page for slug: {slug}\n\n\
         KNOWLEDGE_JSON:\n{knowledge_json}\n\n\
         Pages:\n{guide}\n\n\
         Reply with Markdown only.\n",
        guide = page_guide(variant),
    )
}
