//! Hand-maintained production identity tables.
//!
//! These mirror the external platforms' own id spaces and change only when a
//! platform adds or renumbers an entity, so they live in code rather than in
//! the database. Plan keys are stored pre-normalized (lowercase, no "the "
//! prefix); lot keys are "community:lot".

use super::ExternalId;

const HOMEFINITI_PLANS: &[(&str, ExternalId)] = &[
    ("balboa", 178661), ("cambridge", 199725), ("chatsworth", 178663),
    ("fairmount", 178668), ("kensington", 178674), ("liberty", 178671),
];

const ANEWGO_PLANS: &[(&str, ExternalId)] = &[
    ("balboa", 6286), ("cambridge", 6288), ("chatsworth", 6284),
    ("fairmount", 6285), ("kensington", 6287), ("liberty", 6283),
    ("adelaide", 6276), ("alberto", 6277), ("alfonso", 6279),
    ("amelia", 6278), ("bianca", 6280), ("charles", 6282),
    ("clifton", 6294), ("francesca", 6281), ("isabella", 6275),
    ("ashton", 6292), ("corbridge", 6296), ("cotham", 6291),
    ("easton", 6289), ("rosewood", 6290), ("westbury", 6293),
    ("windsor", 6297), ("sophia", 6270), ("valentino", 6271),
    ("aspen", 6262), ("birch", 6261), ("bluebell", 6255),
    ("bristlecone", 6267), ("cliffrose", 6295), ("foxtail", 6268),
    ("juniper", 6260), ("ponderosa", 6259), ("poplar", 6263),
    ("willow", 6266),
];

const ANEWGO_LOTS: &[(&str, ExternalId)] = &[
    ("parkside:287", 19768), ("parkside:288", 19767), ("parkside:289", 19761),
    ("parkside:290", 19760), ("parkside:291", 19762), ("parkside:292", 19757),
    ("parkside:293", 19758), ("parkside:294", 19756), ("parkside:295", 19752),
    ("parkside:296", 19754), ("parkside:297", 19753), ("parkside:298", 19766),
    ("parkside:299", 19770), ("parkside:300", 19777), ("parkside:301", 19769),
    ("parkside:302", 19772), ("parkside:303", 19778), ("parkside:304", 19755),
    ("parkside:305", 19765), ("parkside:306", 19776), ("parkside:307", 19759),
    ("parkside:308", 19763), ("parkside:309", 19774), ("parkside:310", 19775),
    ("parkside:311", 19773), ("parkside:312", 19764), ("parkside:313", 19779),
    ("parkside:314", 19771), ("amanti lago:1", 19790), ("amanti lago:2", 19791),
    ("amanti lago:3", 19792), ("amanti lago:4", 19793), ("amanti lago:5", 19794),
    ("amanti lago:6", 19795), ("amanti lago:7", 19796), ("amanti lago:8", 19797),
    ("amanti lago:9", 19798), ("amanti lago:10", 19799), ("amanti lago:11", 19800),
    ("amanti lago:12", 19801), ("amanti lago:13", 19802), ("amanti lago:14", 19803),
    ("amanti lago:15", 19804), ("amanti lago:16", 19805), ("amanti lago:17", 19806),
    ("amanti lago:18", 19807), ("amanti lago:19", 19808), ("amanti lago:20", 19809),
    ("amanti lago:21", 19810), ("amanti lago:22", 19811), ("amanti lago:23", 19812),
    ("amanti lago:24", 19813), ("amanti lago:25", 19814), ("amanti lago:26", 19815),
    ("amanti lago:27", 19787), ("amanti lago:28", 19788), ("bella vita:439", 19736),
    ("bella vita:440", 19705), ("bella vita:441", 19741), ("bella vita:442", 19709),
    ("bella vita:443", 19708), ("bella vita:444", 19716), ("bella vita:445", 19707),
    ("bella vita:446", 19743), ("bella vita:447", 19702), ("bella vita:448", 19738),
    ("bella vita:449", 19694), ("bella vita:450", 19700), ("bella vita:451", 19735),
    ("bella vita:452", 19692), ("bella vita:453", 19706), ("bella vita:454", 19733),
    ("bella vita:455", 19695), ("bella vita:456", 19699), ("bella vita:457", 19732),
    ("bella vita:458", 19693), ("bella vita:459", 19701), ("bella vita:460", 19737),
    ("bella vita:461", 19691), ("bella vita:462", 19715), ("bella vita:463", 19683),
    ("bella vita:464", 19722), ("bella vita:465", 19739), ("bella vita:466", 19723),
    ("bella vita:467", 19717), ("bella vita:468", 19742), ("bella vita:469", 19718),
    ("bella vita:470", 19746), ("bella vita:471", 19719), ("bella vita:472", 19740),
    ("bella vita:473", 19724), ("bella vita:474", 19747), ("bella vita:475", 19750),
    ("bella vita:476", 19726), ("bella vita:477", 19729), ("bella vita:478", 19697),
    ("bella vita:479", 19669), ("bella vita:480", 19680), ("bella vita:481", 19671),
    ("bella vita:482", 19675), ("bella vita:483", 19679), ("bella vita:484", 19673),
    ("bella vita:485", 19670), ("bella vita:486", 19688), ("bella vita:487", 19672),
    ("bella vita:488", 19674), ("bella vita:489", 19704), ("bella vita:490", 19682),
    ("bella vita:491", 19696), ("bella vita:492", 19681), ("bella vita:493", 19690),
    ("bella vita:494", 19685), ("bella vita:495", 19686), ("bella vita:496", 19677),
    ("bella vita:497", 19676), ("bella vita:498", 19687), ("bella vita:499", 19703),
    ("bella vita:500", 19684), ("bella vita:501", 19710), ("bella vita:502", 19678),
    ("bella vita:503", 19689), ("bella vita:504", 19698), ("bella vita:505", 19728),
    ("bella vita:506", 19730), ("bella vita:507", 19751), ("bella vita:508", 19734),
    ("bella vita:509", 19731), ("bella vita:510", 19749), ("bella vita:511", 19711),
    ("bella vita:512", 19725), ("bella vita:513", 19712), ("bella vita:514", 19727),
    ("bella vita:515", 19748), ("bella vita:516", 19714), ("bella vita:517", 19720),
    ("bella vita:518", 19744), ("bella vita:519", 19713), ("bella vita:520", 19721),
    ("bella vita:521", 19745), ("bristol farms:102", 19818), ("bristol farms:103", 19817),
    ("bristol farms:101", 19883), ("bristol farms:203", 19842), ("bristol farms:204", 19841),
    ("bristol farms:205", 19836), ("bristol farms:206", 19884), ("bristol farms:207", 19871),
    ("bristol farms:208", 19828), ("bristol farms:209", 19889), ("bristol farms:210", 19888),
    ("bristol farms:211", 19875), ("bristol farms:212", 19832), ("bristol farms:213", 19887),
    ("bristol farms:214", 19876), ("bristol farms:215", 19855), ("bristol farms:216", 19851),
    ("bristol farms:217", 19852), ("bristol farms:218", 19826), ("bristol farms:219", 19864),
    ("bristol farms:220", 19829), ("bristol farms:221", 19831), ("bristol farms:222", 19830),
    ("bristol farms:223", 19856), ("bristol farms:224", 19890), ("bristol farms:225", 19853),
    ("bristol farms:226", 19854), ("bristol farms:227", 19865), ("bristol farms:228", 19892),
    ("bristol farms:229", 19893), ("bristol farms:230", 19881), ("bristol farms:231", 19869),
    ("bristol farms:232", 19849), ("bristol farms:233", 19850), ("bristol farms:301", 19882),
    ("bristol farms:303", 19848), ("bristol farms:304", 19870), ("bristol farms:305", 19827),
    ("bristol farms:306", 19834), ("bristol farms:307", 19858), ("bristol farms:308", 19872),
    ("bristol farms:309", 19833), ("bristol farms:310", 19891), ("bristol farms:311", 19878),
    ("bristol farms:312", 19846), ("bristol farms:314", 19857), ("bristol farms:315", 19837),
    ("bristol farms:316", 19835), ("bristol farms:317", 19877), ("bristol farms:401", 19885),
    ("bristol farms:402", 19825), ("bristol farms:404", 19886), ("bristol farms:405", 19819),
    ("bristol farms:406", 19821), ("bristol farms:407", 19838), ("bristol farms:408", 19874),
    ("bristol farms:409", 19823), ("bristol farms:411", 19824), ("bristol farms:412", 19866),
    ("bristol farms:413", 19879), ("bristol farms:414", 19847), ("bristol farms:415", 19843),
    ("bristol farms:416", 19894), ("bristol farms:418", 19867), ("bristol farms:419", 19873),
    ("bristol farms:420", 19880), ("bristol farms:421", 19868), ("bristol farms:422", 19844),
    ("bristol farms:423", 19822), ("bristol farms:424", 19845), ("bristol farms:425", 19816),
    ("bristol farms:426", 19840), ("bristol farms:427", 19820), ("bristol farms:428", 19839),
    ("windflower:1", 19595), ("windflower:2", 19596), ("windflower:3", 19597),
    ("windflower:4", 19598), ("windflower:5", 19599), ("windflower:6", 19600),
    ("windflower:7", 19601), ("windflower:8", 19602), ("windflower:9", 19603),
    ("windflower:10", 19604), ("windflower:11", 19605), ("windflower:12", 19606),
    ("windflower:13", 19607), ("windflower:14", 19608), ("windflower:15", 19609),
    ("windflower:16", 19610), ("windflower:17", 19611), ("windflower:18", 19612),
    ("windflower:19", 19613), ("windflower:20", 19614), ("windflower:21", 19615),
    ("windflower:22", 19616), ("windflower:23", 19617), ("windflower:24", 19618),
    ("windflower:25", 19619), ("windflower:26", 19620), ("windflower:250", 19662),
    ("windflower:251", 19661), ("windflower:252", 19660), ("windflower:253", 19659),
    ("windflower:254", 19658), ("windflower:255", 19657), ("windflower:256", 19656),
    ("windflower:257", 19655), ("windflower:258", 19654), ("windflower:259", 19653),
    ("windflower:260", 19652), ("windflower:261", 19629), ("windflower:262", 19630),
    ("windflower:263", 19631), ("windflower:264", 19632), ("windflower:265", 19633),
    ("windflower:266", 19634), ("windflower:267", 19635), ("windflower:401", 19783),
    ("windflower:402", 19636), ("windflower:403", 19637), ("windflower:404", 19638),
    ("windflower:405", 19785), ("windflower:406", 19639), ("windflower:407", 19640),
    ("windflower:408", 19641), ("windflower:409", 19786), ("windflower:410", 19642),
    ("windflower:411", 19643), ("windflower:412", 19644), ("windflower:413", 19784),
    ("windflower:414", 19645), ("windflower:415", 19646), ("windflower:416", 19647),
    ("windflower:417", 19648), ("windflower:418", 19649), ("windflower:419", 19650),
    ("windflower:420", 19651), ("windflower:421", 19621), ("windflower:422", 19622),
    ("windflower:423", 19623), ("windflower:424", 19624), ("windflower:429", 19780),
    ("windflower:430", 19781), ("windflower:431", 19782),
];

const ANEWGO_COMMUNITIES: &[(&str, ExternalId)] = &[
    ("parkside", 1660), ("bella vita", 1659), ("bristol farms", 1661),
    ("amanti lago", 1658), ("windflower", 1657),
];

const NEWHOMEFEED_PLANS: &[(&str, ExternalId)] = &[
    ("sophia mountain modern", 5069429), ("sophia mountain traditional", 5069430), ("valentino mountain modern", 5069431),
    ("valentino mountain traditional", 5069432), ("adelaide", 5069434), ("alberto", 5069435),
    ("alfonso", 5069436), ("amelia", 5069437), ("bianca", 5069438),
    ("charles", 5069439), ("francesca", 5069440), ("isabella", 5069441),
    ("ashton", 7754412), ("westbury", 7754413), ("easton", 7754414),
    ("cotham", 7754415), ("corbridge", 7754416), ("rosewood", 7754417),
    ("balboa", 5069443), ("chatsworth", 5069444), ("fairmount", 5069445),
    ("kensington", 5069446), ("liberty", 5069447), ("birch", 5069450),
    ("bluebell", 5069451), ("bristlecone", 5069452), ("foxtail", 5069453),
    ("juniper", 5069457), ("ponderosa", 5069460), ("poplar", 5069464),
    ("willow", 5069467),
];

pub(super) fn homefiniti_plans() -> &'static [(&'static str, ExternalId)] {
    HOMEFINITI_PLANS
}

pub(super) fn anewgo_plans() -> &'static [(&'static str, ExternalId)] {
    ANEWGO_PLANS
}

pub(super) fn anewgo_lots() -> &'static [(&'static str, ExternalId)] {
    ANEWGO_LOTS
}

pub(super) fn anewgo_communities() -> &'static [(&'static str, ExternalId)] {
    ANEWGO_COMMUNITIES
}

pub(super) fn newhomefeed_plans() -> &'static [(&'static str, ExternalId)] {
    NEWHOMEFEED_PLANS
}
